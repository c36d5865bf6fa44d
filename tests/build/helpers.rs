//! Shared fixtures for the build-stage tests.

use rill::build::{BuildError, IncludeLoader, ModuleBuilder, PostPassResult, run_postpass};
use rill::module::{DataSegment, ModuleImage, RawInstr};

/// Loader for programs without includes.
pub struct NoIncludes;

impl IncludeLoader for NoIncludes {
    fn load(&mut self, path: &str) -> Result<DataSegment, BuildError> {
        Err(BuildError::include(format!("unexpected include of {path}")))
    }
}

/// Loader that hands out one canned data segment for every path.
pub struct CannedInclude(pub DataSegment);

impl IncludeLoader for CannedInclude {
    fn load(&mut self, _path: &str) -> Result<DataSegment, BuildError> {
        Ok(self.0.clone())
    }
}

/// Builds and post-passes a program with no includes.
pub fn build_lines(lines: &[&str]) -> PostPassResult {
    build_lines_with(lines, &mut NoIncludes)
}

/// Builds and post-passes a program against a custom include loader.
pub fn build_lines_with(lines: &[&str], loader: &mut dyn IncludeLoader) -> PostPassResult {
    let mut builder = ModuleBuilder::new("test");
    for line in lines {
        builder
            .add_line(line, loader)
            .expect("line should not abort the build");
    }
    run_postpass(builder.finish()).expect("post-pass should succeed")
}

/// Round-trips a post-pass result through the binary codec.
pub fn decode(result: &PostPassResult) -> ModuleImage {
    let bytes = rill::module::encode_module(&result.include_blobs, &result.code, &result.data)
        .expect("module should encode");
    ModuleImage::decode(&bytes).expect("module should decode")
}

/// Convenience: build, encode, decode, and return the instruction stream.
pub fn decode_lines(lines: &[&str]) -> Vec<RawInstr> {
    decode(&build_lines(lines)).code
}
