pub mod generation;
pub mod input_normalizer;
pub mod prompt_builder;
pub mod response_parser;
pub mod result_assembler;
