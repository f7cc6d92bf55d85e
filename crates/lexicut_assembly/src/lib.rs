//! Word segmentation and assembly ordering.
//!
//! Turns a flat list of timestamped words into sentence units (the editing
//! granularity) and bounded phrase groups (the description and ordering
//! granularity), then produces an initial ordering of those groups.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod broll;
mod orderer;
mod segmenter;

pub use broll::broll_eligible_sources;
pub use orderer::{
    AssemblyOrder, OrderingStrategy, arrange_sentences, order_groups, repair_duplicates,
    repair_order,
};
pub use segmenter::{
    SegmenterConfig, assign_origin_groups, group_for_description, segment_into_sentences,
    segment_sources,
};
