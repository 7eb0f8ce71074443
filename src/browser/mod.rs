use anyhow::{bail, Context, Result};

use crate::resort::ResortSnapshot;

/// Open the resort's report page in the user's default browser
///
/// # Errors
/// Returns error if the resort has no URL or no browser can be opened
pub fn open_resort_page(resort: &ResortSnapshot) -> Result<()> {
    let url = resort.url.trim();
    if url.is_empty() {
        bail!("{} has no report page", resort.name);
    }
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_is_an_error() {
        let mut resort = crate::mock::resorts().unwrap().remove(0);
        resort.url = "  ".to_string();
        let err = open_resort_page(&resort).unwrap_err();
        assert!(err.to_string().contains("has no report page"));
    }
}
