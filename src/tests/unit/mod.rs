mod generation_tests;
mod session_tests;
