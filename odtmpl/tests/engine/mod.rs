mod archive;
mod render;
