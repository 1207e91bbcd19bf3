//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::EditorConfig;
pub use site::LinksConfig;
pub use site::PostConfig;
pub use site::PostsConfig;
pub use site::SiteConfig;
pub use site::SocialLink;
