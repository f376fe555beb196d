mod test_utils;
mod types_tests;
