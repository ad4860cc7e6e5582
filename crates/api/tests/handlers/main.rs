#[path = "../test_utils.rs"]
mod test_utils;

mod branch_test;
mod middleware_test;
mod people_test;
mod service_test;
