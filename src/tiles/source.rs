use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Highest zoom the server has tiles for
    fn max_zoom(&self) -> u8 {
        19
    }
}

/// XYZ URL template source.
///
/// Understands `{z}`, `{x}`, `{y}`, `{r}` (`@2x` on retina) and `{s}`.
/// A character range such as `{a-d}` stands for the subdomains `a..=d`
/// and is rewritten to `{s}`.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzSource {
    template: String,
    subdomains: Vec<String>,
    retina: bool,
    max_zoom: u8,
}

impl XyzSource {
    pub fn new(template: impl Into<String>) -> Self {
        let (template, range) = expand_subdomain_range(&template.into());
        let subdomains = if range.is_empty() {
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        } else {
            range
        };
        Self {
            template,
            subdomains,
            retina: false,
            max_zoom: 19,
        }
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }
}

impl TileSource for XyzSource {
    fn url(&self, coord: TileCoord) -> String {
        let mut url = self
            .template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", if self.retina { "@2x" } else { "" });

        if url.contains("{s}") {
            let sub = if self.subdomains.is_empty() {
                ""
            } else {
                let idx = ((coord.x as u64 + coord.y as u64) % self.subdomains.len() as u64) as usize;
                self.subdomains[idx].as_str()
            };
            url = url.replace("{s}", sub);
        }
        url
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// Rewrites the first `{a-d}` style range to `{s}` and returns its letters
fn expand_subdomain_range(template: &str) -> (String, Vec<String>) {
    let bytes = template.as_bytes();
    let mut i = 0;
    while let Some(offset) = template[i..].find('{') {
        let start = i + offset;
        if bytes.len() >= start + 5 && bytes[start + 2] == b'-' && bytes[start + 4] == b'}' {
            let (from, to) = (bytes[start + 1], bytes[start + 3]);
            if from.is_ascii_alphanumeric() && to.is_ascii_alphanumeric() && from <= to {
                let letters = (from..=to).map(|c| (c as char).to_string()).collect();
                let rewritten = format!("{}{{s}}{}", &template[..start], &template[start + 5..]);
                return (rewritten, letters);
            }
        }
        i = start + 1;
    }
    (template.to_string(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_template() {
        let source = XyzSource::new(
            "https://{a-d}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png",
        );
        assert_eq!(source.subdomains(), &["a", "b", "c", "d"]);
        assert_eq!(
            source.url(TileCoord::new(5, 2, 3)),
            "https://d.basemaps.cartocdn.com/rastertiles/voyager/3/5/2.png"
        );

        let retina = source.with_retina(true);
        assert_eq!(
            retina.url(TileCoord::new(4, 0, 3)),
            "https://a.basemaps.cartocdn.com/rastertiles/voyager/3/4/0@2x.png"
        );
    }

    #[test]
    fn test_zyx_order() {
        let source = XyzSource::new(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        );
        assert_eq!(
            source.url(TileCoord::new(7, 11, 5)),
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/5/11/7"
        );
    }

    #[test]
    fn test_explicit_subdomains() {
        let source = XyzSource::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
            .with_subdomains(["a", "b", "c"]);
        assert_eq!(
            source.url(TileCoord::new(1, 1, 2)),
            "https://c.tile.openstreetmap.org/2/1/1.png"
        );
    }
}
