#![allow(dead_code)]

pub use runhook_test_utils::builders;
pub use runhook_test_utils::{init_tracing, with_timeout, RecordingSink};
