//! Timeline data model: clips, edits, ingestion and directory persistence.

pub mod archive;
/// Building timelines from loose image files.
pub mod ingest;
/// Clips and the ordered timeline with its edit operations.
pub mod model;
/// A timeline bundled with the image bytes it references.
pub mod project;
