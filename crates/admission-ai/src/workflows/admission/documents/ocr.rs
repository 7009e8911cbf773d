use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use super::{DocumentError, OcrEngine};
use crate::config::OcrConfig;

/// Rasterises pages with `pdftoppm` and recognises each page with `tesseract`.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    pdftoppm_bin: PathBuf,
    tesseract_bin: PathBuf,
    dpi: u32,
}

impl TesseractOcr {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            pdftoppm_bin: config.pdftoppm_bin.clone(),
            tesseract_bin: config.tesseract_bin.clone(),
            dpi: config.dpi,
        }
    }

    fn rasterise(&self, pdf: &Path, workdir: &Path) -> Result<Vec<PathBuf>, DocumentError> {
        let prefix = workdir.join("page");
        run(Command::new(&self.pdftoppm_bin)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix))?;

        let entries = fs::read_dir(workdir).map_err(|source| DocumentError::Io {
            path: workdir.to_path_buf(),
            source,
        })?;

        // pdftoppm zero-pads page numbers to a common width, so name order is page order.
        let mut pages: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension() == Some(OsStr::new("png")))
            .collect();
        pages.sort();

        if pages.is_empty() {
            return Err(DocumentError::NoPages {
                path: pdf.to_path_buf(),
            });
        }

        Ok(pages)
    }

    fn recognize_image(&self, image: &Path) -> Result<String, DocumentError> {
        let output = run(Command::new(&self.tesseract_bin).arg(image).arg("stdout"))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_pdf(&self, path: &Path) -> Result<String, DocumentError> {
        let workdir = tempfile::tempdir().map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = self.rasterise(path, workdir.path())?;
        debug!(path = %path.display(), pages = pages.len(), "rasterised document for OCR");

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.recognize_image(page)?);
        }

        Ok(text)
    }
}

fn run(command: &mut Command) -> Result<Output, DocumentError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command.output().map_err(|err| DocumentError::Command {
        program: program.clone(),
        detail: err.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DocumentError::Command {
            program,
            detail: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(output)
}
