use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A known pill entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PillRecord {
    /// name of the pill
    pub name: String,
    /// color of the pill
    pub color: String,
    /// shape of the pill
    pub shape: String,
    /// imprint on the pill
    pub imprint: String,
    /// url of the pill
    pub url: String,
    /// image of the pill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PillRecord {
    /// Creates a record without an image.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        shape: impl Into<String>,
        imprint: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            shape: shape.into(),
            imprint: imprint.into(),
            url: url.into(),
            image_url: None,
        }
    }

    /// Attaches an image URL.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Returns the name of the first empty attribute, if any.
    ///
    /// `image_url` may be absent, but when present it must not be empty.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        let fields = [
            ("name", self.name.as_str()),
            ("color", self.color.as_str()),
            ("shape", self.shape.as_str()),
            ("imprint", self.imprint.as_str()),
            ("url", self.url.as_str()),
        ];

        fields
            .into_iter()
            .find(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .or_else(|| match self.image_url.as_deref() {
                Some("") => Some("image_url"),
                _ => None,
            })
    }
}
