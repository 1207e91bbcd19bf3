//! GROQ queries issued against the CMS

/// One post by `$slug`, with author and categories dereferenced
pub const POST_QUERY: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  title,
  slug,
  body,
  publishedAt,
  mainImage,
  author->{_id, name, image},
  categories[]->{_id, title}
}"#;

/// Every defined post slug
pub const POST_SLUGS_QUERY: &str = r#"*[_type == "post" && defined(slug.current)][].slug.current"#;

/// Newest posts with a slug, capped at `limit`
pub fn posts_query(limit: usize) -> String {
    format!(
        r#"*[_type == "post" && defined(slug.current)] | order(publishedAt desc)[0...{}]{{
  _id,
  title,
  slug,
  publishedAt,
  body
}}"#,
        limit
    )
}
