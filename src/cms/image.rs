//! Image URL builder for CMS-hosted assets

use crate::config::CmsConfig;
use crate::content::ImageRef;

/// Default asset CDN
const IMAGE_CDN: &str = "https://cdn.sanity.io";

/// How the CDN fits an image into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Clip,
    Crop,
    Fill,
    FillMax,
    Max,
    Scale,
    Min,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fit::Clip => "clip",
            Fit::Crop => "crop",
            Fit::Fill => "fill",
            Fit::FillMax => "fillmax",
            Fit::Max => "max",
            Fit::Scale => "scale",
            Fit::Min => "min",
        }
    }
}

/// Parsed `image-<id>-<w>x<h>-<ext>` asset reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    pub fn parse(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("image-")?;
        let (rest, format) = rest.rsplit_once('-')?;
        let (id, dimensions) = rest.rsplit_once('-')?;
        let (width, height) = dimensions.split_once('x')?;

        if id.is_empty() || format.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            width: width.parse().ok()?,
            height: height.parse().ok()?,
            format: format.to_string(),
        })
    }

    fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

/// Resolves image references to CDN URLs
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
    base_url: String,
}

impl ImageUrlBuilder {
    pub fn new(cms: &CmsConfig) -> Self {
        Self {
            project_id: cms.project_id.clone(),
            dataset: cms.dataset.clone(),
            base_url: IMAGE_CDN.to_string(),
        }
    }

    /// Start building a URL for an image
    pub fn image<'a>(&'a self, source: &'a ImageRef) -> ImageUrl<'a> {
        ImageUrl {
            builder: self,
            source,
            width: None,
            height: None,
            fit: None,
        }
    }
}

/// Sized image URL under construction
#[derive(Debug, Clone)]
pub struct ImageUrl<'a> {
    builder: &'a ImageUrlBuilder,
    source: &'a ImageRef,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<Fit>,
}

impl<'a> ImageUrl<'a> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    /// Final URL, or `None` when the reference cannot be resolved
    pub fn url(&self) -> Option<String> {
        let base = self.base()?;

        let mut params = Vec::new();
        if let Some(width) = self.width {
            params.push(format!("w={}", width));
        }
        if let Some(height) = self.height {
            params.push(format!("h={}", height));
        }
        if let Some(fit) = self.fit {
            params.push(format!("fit={}", fit.as_str()));
        }

        if params.is_empty() {
            Some(base)
        } else {
            Some(format!("{}?{}", base, params.join("&")))
        }
    }

    fn base(&self) -> Option<String> {
        if let Some(reference) = self.source.asset_ref() {
            let asset = AssetId::parse(reference)?;
            if self.builder.project_id.is_empty() {
                tracing::warn!("Cannot resolve image {}: no CMS project id", reference);
                return None;
            }
            return Some(format!(
                "{}/images/{}/{}/{}",
                self.builder.base_url,
                self.builder.project_id,
                self.builder.dataset,
                asset.file_name()
            ));
        }

        self.source
            .asset
            .as_ref()
            .and_then(|asset| asset.url.clone())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::AssetRef;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new(&CmsConfig {
            project_id: "proj".to_string(),
            dataset: "production".to_string(),
            ..CmsConfig::default()
        })
    }

    #[test]
    fn test_parse_asset_id() {
        let asset = AssetId::parse("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg").unwrap();
        assert_eq!(asset.id, "Tb9Ew8CXIwaY6R1kjMvI0uRR");
        assert_eq!(asset.width, 2000);
        assert_eq!(asset.height, 3000);
        assert_eq!(asset.format, "jpg");

        assert_eq!(AssetId::parse("file-abc-pdf"), None);
        assert_eq!(AssetId::parse("image-abc-axb-png"), None);
        assert_eq!(AssetId::parse("image-"), None);
    }

    #[test]
    fn test_sized_url() {
        let builder = builder();
        let image = ImageRef::from_ref("image-abc-1600x900-jpg");
        let url = builder
            .image(&image)
            .width(1200)
            .height(630)
            .fit(Fit::Crop)
            .url();
        assert_eq!(
            url.as_deref(),
            Some("https://cdn.sanity.io/images/proj/production/abc-1600x900.jpg?w=1200&h=630&fit=crop")
        );
    }

    #[test]
    fn test_plain_url_without_params() {
        let builder = builder();
        let image = ImageRef::from_ref("image-abc-10x10-png");
        assert_eq!(
            builder.image(&image).url().as_deref(),
            Some("https://cdn.sanity.io/images/proj/production/abc-10x10.png")
        );
    }

    #[test]
    fn test_unresolvable_sources() {
        let builder = builder();
        assert_eq!(builder.image(&ImageRef::default()).url(), None);
        assert_eq!(builder.image(&ImageRef::from_ref("garbage")).url(), None);

        let unconfigured = ImageUrlBuilder::new(&CmsConfig::default());
        let image = ImageRef::from_ref("image-abc-10x10-png");
        assert_eq!(unconfigured.image(&image).url(), None);
    }

    #[test]
    fn test_falls_back_to_asset_url() {
        let builder = builder();
        let image = ImageRef {
            asset: Some(AssetRef {
                reference: None,
                url: Some("https://img.example.com/a.png".to_string()),
            }),
            alt: None,
        };
        assert_eq!(
            builder.image(&image).width(10).url().as_deref(),
            Some("https://img.example.com/a.png?w=10")
        );
    }
}
