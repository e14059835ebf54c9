/// Reader and writer abstractions shared by every step.
pub mod item;

/// Record-by-record execution of a reader into a writer.
pub mod step;
