//! Build tool definitions.

use crate::runner::ProcessCommand;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use texdraft_core::BuildConfig;

/// An external document compiler and how to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTool {
    /// Executable to run.
    pub program: String,

    /// Arguments placed before the source path.
    pub args: Vec<String>,

    /// Extension of the artifact the tool writes, without the dot.
    pub output_extension: String,
}

impl BuildTool {
    /// latexmk -pdf -pdflatex=pdflatex -interaction=nonstopmode <source>
    pub fn latexmk() -> Self {
        Self::from_config(&BuildConfig::default())
    }

    /// Create a tool definition from the `[build]` config section.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            output_extension: config.output_extension.clone(),
        }
    }

    /// Create a custom tool definition.
    pub fn custom(program: impl Into<String>, args: Vec<String>, output_extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            output_extension: output_extension.into(),
        }
    }

    /// Command line for compiling `source` inside `working_dir`. The source
    /// path is always the last argument.
    pub fn command_for(&self, source: &Path, working_dir: &Path) -> ProcessCommand {
        let mut args = self.args.clone();
        args.push(source.to_string_lossy().into_owned());
        ProcessCommand {
            program: self.program.clone(),
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Where the tool is expected to leave its output:
    /// `<working_dir>/<source stem>.<output_extension>`.
    pub fn artifact_path(&self, source: &Path, working_dir: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        working_dir.join(format!("{}.{}", stem, self.output_extension))
    }
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::latexmk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latexmk_command() {
        let tool = BuildTool::latexmk();
        let cmd = tool.command_for(Path::new("/ms/paper.tex"), Path::new("/ms"));
        assert_eq!(cmd.program, "latexmk");
        assert_eq!(
            cmd.args,
            vec![
                "-pdf".to_string(),
                "-pdflatex=pdflatex".to_string(),
                "-interaction=nonstopmode".to_string(),
                "/ms/paper.tex".to_string(),
            ]
        );
        assert_eq!(cmd.working_dir, PathBuf::from("/ms"));
    }

    #[test]
    fn test_artifact_path_uses_working_dir_and_stem() {
        let tool = BuildTool::latexmk();
        assert_eq!(
            tool.artifact_path(Path::new("/elsewhere/paper.tex"), Path::new("/ms")),
            PathBuf::from("/ms/paper.pdf")
        );
    }

    #[test]
    fn test_from_config() {
        let config = BuildConfig {
            program: "tectonic".to_string(),
            args: vec![],
            output_extension: "pdf".to_string(),
            timeout_secs: 30,
        };
        let tool = BuildTool::from_config(&config);
        let cmd = tool.command_for(Path::new("a.tex"), Path::new("."));
        assert_eq!(cmd.program, "tectonic");
        assert_eq!(cmd.args, vec!["a.tex".to_string()]);
    }

    #[test]
    fn test_custom_output_extension() {
        let tool = BuildTool::custom("make4ht", vec![], "html");
        assert_eq!(
            tool.artifact_path(Path::new("notes.tex"), Path::new("/w")),
            PathBuf::from("/w/notes.html")
        );
    }
}
