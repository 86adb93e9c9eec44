mod listings_tests;
mod map_page_tests;
mod selection_tests;
mod webhook_tests;
