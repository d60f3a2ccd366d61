pub mod password_extractor;
