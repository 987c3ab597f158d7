pub mod heading_extractor;
