mod api_tests;
mod common;
mod data_manager_tests;
