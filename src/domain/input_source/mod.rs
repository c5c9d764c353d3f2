pub mod directory_path;
pub mod input_source;
pub mod path_error;
pub mod png_file_path;
