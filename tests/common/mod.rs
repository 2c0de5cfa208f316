//! Shared test helpers for integration tests
//!
//! Fixtures mimic OCR output of an IQC inspection form: a metadata table,
//! then a dimension table with one value and one judgment cell per dimension.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get an iqc command, isolated from any user config
pub fn iqc() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("iqc"));
    cmd.env_remove("IQC_LOG")
        .env_remove("IQC_CONFIG")
        .env_remove("IQC_SAMPLE_SIZE")
        .env_remove("IQC_SUBGROUP_SIZE")
        .env_remove("IQC_MIN_COUNT");
    cmd
}

/// Measurements of dimension ①, spec 27.80+0.10-0.00
pub const DIM1: [f64; 10] = [
    27.85, 27.86, 27.84, 27.85, 27.87, 27.83, 27.85, 27.86, 27.84, 27.85,
];

/// Measurements of dimension ②, spec Φ6.00±0.10
pub const DIM2: [f64; 10] = [6.02, 6.01, 6.03, 6.00, 6.02, 5.99, 6.01, 6.02, 6.00, 6.01];

/// Measurements of dimension ③, spec 73.20+0.00-0.15
pub const DIM3: [f64; 10] = [
    73.14, 73.12, 73.15, 73.13, 73.11, 73.12, 73.14, 73.13, 73.12, 73.15,
];

fn td(text: &str) -> String {
    format!("<td>{}</td>", text)
}

fn data_rows(dim1: &[f64], dim2: &[f64], dim3: &[f64]) -> String {
    dim1.iter()
        .zip(dim2)
        .zip(dim3)
        .enumerate()
        .map(|(i, ((a, b), c))| {
            format!(
                "<tr>{}{}{}{}{}{}{}</tr>\n",
                td(&(i + 1).to_string()),
                td(&format!("{:.2}", a)),
                td("OK"),
                td(&format!("{:.2}", b)),
                td("OK"),
                td(&format!("{:.2}", c)),
                td("OK"),
            )
        })
        .collect()
}

/// An HTML inspection form with metadata and three dimensions
pub fn html_form_with(dim2: &[f64]) -> String {
    format!(
        "# 来料检验报告\n\n\
         <table>\n\
         <tr><td>物料名称</td><td>垫片</td><td>物料编码</td><td>3.01.0042</td></tr>\n\
         <tr><td>物料批号</td><td>JSR20240311</td><td>供应商</td><td>华兴五金</td></tr>\n\
         <tr><td>进料数量</td><td>2000</td><td>抽样数量</td><td>10</td></tr>\n\
         </table>\n\n\
         ### 尺寸检验结果\n\n\
         <table>\n\
         <tr><td>检验位置</td><td>①</td><td>②</td><td>③</td></tr>\n\
         <tr><td>检验标准</td><td>27.80+0.10-0.00</td><td>Φ6.00±0.10</td><td>73.20+0.00-0.15</td></tr>\n\
         <tr><td>结果序号</td><td>测量值</td><td>判定</td><td>测量值</td><td>判定</td><td>测量值</td><td>判定</td></tr>\n\
         {}\
         </table>\n",
        data_rows(&DIM1, dim2, &DIM3)
    )
}

/// The standard form, all dimensions in tolerance
pub fn html_form() -> String {
    html_form_with(&DIM2)
}

/// The standard form with one dimension ② part out of tolerance
pub fn html_form_ng() -> String {
    let mut dim2 = DIM2;
    dim2[4] = 6.15;
    html_form_with(&dim2)
}

/// A Markdown form with no declared sample size
pub fn markdown_form(rows: usize) -> String {
    let mut text = String::from(
        "| 检验位置 | ① | ② |\n\
         |---|---|---|\n\
         | **检验标准** | 10.00±0.05 | 5.00+0.02-0.02 |\n",
    );
    for i in 0..rows {
        text.push_str(&format!(
            "| {} | {:.3} | OK | {:.3} | OK |\n",
            i + 1,
            10.0 + (i % 5) as f64 * 0.005,
            5.0 + (i % 3) as f64 * 0.002
        ));
    }
    text
}

/// Write a document into a temp directory
pub fn write_doc(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// A temp directory holding the standard form as `form.md`
pub fn setup_form_dir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(tmp.path(), "form.md", &html_form());
    (tmp, path)
}
