//! Storage tests: writer and reader over real file pairs

mod writer_tests;
