pub mod digest;
pub mod members;
pub mod urls;

pub use digest::digest_value;
pub use members::partition_members;
pub use urls::report_candidates;
