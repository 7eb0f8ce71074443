pub mod formatter;

pub use formatter::{
    format_age, format_history, format_ratio, format_resort_detail, format_resort_table,
    format_score, format_summary, format_tsv, should_use_colors,
};
