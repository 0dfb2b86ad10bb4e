use crate::data::category_key;
use crate::prelude::HashMap;
use once_cell::sync::Lazy;
use reqwest::Url;

/// Icon used for any category without an entry of its own
pub const DEFAULT_ICON: &str = "https://cdn-icons-png.flaticon.com/512/684/684908.png";

static BUILTIN_ICONS: Lazy<HashMap<String, String>> = Lazy::new(|| {
    [
        ("monument", "https://cdn-icons-png.flaticon.com/512/684/684908.png"),
        ("park", "https://cdn-icons-png.flaticon.com/512/854/854878.png"),
        ("museum", "https://cdn-icons-png.flaticon.com/512/190/190583.png"),
        ("restaurant", "https://cdn-icons-png.flaticon.com/512/3075/3075977.png"),
        ("hotel", "https://cdn-icons-png.flaticon.com/512/139/139899.png"),
        ("shopping", "https://cdn-icons-png.flaticon.com/512/2331/2331970.png"),
        ("hospital", "https://cdn-icons-png.flaticon.com/512/2966/2966486.png"),
        ("school", "https://cdn-icons-png.flaticon.com/512/3135/3135755.png"),
        ("library", "https://cdn-icons-png.flaticon.com/512/2920/2920264.png"),
        ("cafe", "https://cdn-icons-png.flaticon.com/512/2965/2965567.png"),
        ("theater", "https://cdn-icons-png.flaticon.com/512/888/888063.png"),
        ("airport", "https://cdn-icons-png.flaticon.com/512/3063/3063825.png"),
        ("trainstation", "https://cdn-icons-png.flaticon.com/512/235/235861.png"),
        ("busstop", "https://cdn-icons-png.flaticon.com/512/201/201818.png"),
        ("beach", "https://cdn-icons-png.flaticon.com/512/869/869869.png"),
        ("mountain", "https://cdn-icons-png.flaticon.com/512/1047/1047500.png"),
        ("zoo", "https://cdn-icons-png.flaticon.com/512/616/616408.png"),
        ("stadium", "https://cdn-icons-png.flaticon.com/512/67/67745.png"),
        ("temple", "https://cdn-icons-png.flaticon.com/512/1995/1995470.png"),
        ("church", "https://cdn-icons-png.flaticon.com/512/1995/1995522.png"),
        ("bank", "https://cdn-icons-png.flaticon.com/512/2331/2331940.png"),
        ("atm", "https://cdn-icons-png.flaticon.com/512/483/483408.png"),
        ("pharmacy", "https://cdn-icons-png.flaticon.com/512/2967/2967350.png"),
        ("gasstation", "https://cdn-icons-png.flaticon.com/512/3105/3105798.png"),
        ("parking", "https://cdn-icons-png.flaticon.com/512/854/854929.png"),
        ("bridge", "https://cdn-icons-png.flaticon.com/512/484/484582.png"),
        ("market", "https://cdn-icons-png.flaticon.com/512/3075/3075974.png"),
        ("university", "https://cdn-icons-png.flaticon.com/512/3135/3135810.png"),
        ("government", "https://cdn-icons-png.flaticon.com/512/1903/1903162.png"),
        ("police", "https://cdn-icons-png.flaticon.com/512/1865/1865269.png"),
        ("firestation", "https://cdn-icons-png.flaticon.com/512/2037/2037789.png"),
        ("playground", "https://cdn-icons-png.flaticon.com/512/4320/4320337.png"),
    ]
    .into_iter()
    .map(|(category, url)| (category.to_string(), url.to_string()))
    .collect()
});

/// Maps category labels to marker icon URLs.
///
/// Lookups are case-insensitive and ignore surrounding whitespace. Unknown
/// categories, and entries whose URL is not an absolute http(s) URL, resolve
/// to the default icon so a bad entry never hides a marker.
#[derive(Debug, Clone)]
pub struct IconResolver {
    icons: HashMap<String, String>,
    default_icon: String,
}

impl IconResolver {
    /// The built-in category table
    pub fn builtin() -> Self {
        Self {
            icons: BUILTIN_ICONS.clone(),
            default_icon: DEFAULT_ICON.to_string(),
        }
    }

    /// Built-in table with entries added or replaced from configuration
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut resolver = Self::builtin();
        for (category, url) in overrides {
            resolver.insert(category, url);
        }
        resolver
    }

    pub fn insert(&mut self, category: &str, url: impl Into<String>) {
        let url = url.into();
        if !is_fetchable(&url) {
            log::warn!("icon for category '{}' is not an http(s) url: {}", category, url);
        }
        self.icons.insert(category_key(category), url);
    }

    pub fn resolve(&self, category: &str) -> &str {
        match self.icons.get(&category_key(category)) {
            Some(url) if is_fetchable(url) => url,
            _ => &self.default_icon,
        }
    }

    pub fn default_icon(&self) -> &str {
        &self.default_icon
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_fetchable(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}
