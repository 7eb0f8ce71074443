use std::cmp::Ordering;

use crate::resort::ResortSnapshot;

/// Keys the resort list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    ShredScore,
    SnowMountain,
    NewSnow,
    SlopesOpenKm,
    LiftsOpen,
    Name,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::ShredScore,
        SortKey::SnowMountain,
        SortKey::NewSnow,
        SortKey::SlopesOpenKm,
        SortKey::LiftsOpen,
        SortKey::Name,
    ];

    /// Parse a key by its wire name (`shredScore`) or snake_case name.
    /// Unknown names return `None`, which leaves the input order untouched.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "shredscore" | "score" => Some(SortKey::ShredScore),
            "snowmountain" => Some(SortKey::SnowMountain),
            "newsnow" => Some(SortKey::NewSnow),
            "slopesopenkm" => Some(SortKey::SlopesOpenKm),
            "liftsopen" => Some(SortKey::LiftsOpen),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }

    /// Name used on the wire and on the command line
    pub fn wire_name(self) -> &'static str {
        match self {
            SortKey::ShredScore => "shredScore",
            SortKey::SnowMountain => "snowMountain",
            SortKey::NewSnow => "newSnow",
            SortKey::SlopesOpenKm => "slopesOpenKm",
            SortKey::LiftsOpen => "liftsOpen",
            SortKey::Name => "name",
        }
    }

    /// Comma-separated wire names, for help and error text
    pub fn valid_names() -> String {
        Self::ALL.map(Self::wire_name).join(", ")
    }

    /// Numeric value for descending keys; `None` for unreported values and for `Name`
    fn value(self, resort: &ResortSnapshot) -> Option<f64> {
        match self {
            SortKey::ShredScore => resort.shred_score(),
            SortKey::SnowMountain => Some(resort.snow_mountain),
            SortKey::NewSnow => Some(resort.new_snow),
            SortKey::SlopesOpenKm => resort.slopes_open_km,
            SortKey::LiftsOpen => resort.lifts_open.map(f64::from),
            SortKey::Name => None,
        }
    }
}

/// Descending with absent values last.
fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Base letter for a lowercase Latin letter with a diacritic (Latin-1 and
/// Latin Extended-A, plus Romanian comma-below letters).
fn fold_letter(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĳ' => "ij",
        'ĵ' => "j",
        'ķ' | 'ĸ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' | 'ſ' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

/// Primary collation key for German names (DIN 5007-1): case-insensitive,
/// umlauts sort as their base vowel and `ß` as `ss`. Other accented Latin
/// letters fold to their base letter; stray combining marks are dropped.
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if ('\u{0300}'..='\u{036f}').contains(&c) {
            continue;
        }
        match fold_letter(c) {
            Some(base) => key.push_str(base),
            None => key.push(c),
        }
    }
    key
}

/// German name order: collation key first, exact text to separate `Mull`/`Müll`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Stable sort by `key`. Numeric keys descend, `Name` ascends.
pub fn sort_resorts(resorts: &mut [&ResortSnapshot], key: SortKey) {
    match key {
        SortKey::Name => {
            resorts.sort_by_cached_key(|r| (collation_key(&r.name), r.name.clone()));
        }
        _ => resorts.sort_by(|a, b| compare_desc(key.value(a), key.value(b))),
    }
}
