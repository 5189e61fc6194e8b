//! Tesseract OCR 引擎实现（CLI 包装）

use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::token::{LineKey, Token, TokenBox};
use crate::OcrEngine;

/// Tesseract 配置
///
/// 可执行文件路径是显式配置项，构造时传入引擎；
/// 不使用任何进程级全局覆盖，多份配置互不干扰。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Tesseract 可执行文件路径，缺省用 PATH 中的 `tesseract`
    pub binary_path: Option<String>,
    /// tessdata 目录路径
    pub tessdata_path: Option<String>,
    /// 页面分割模式 (0-13)
    pub psm: Option<u8>,
    /// OCR 引擎模式 (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(6)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(1)
    }
}

/// Tesseract OCR 引擎
pub struct TesseractEngine {
    config: TesseractConfig,
    version: String,
}

impl TesseractEngine {
    /// 创建引擎，构造时验证可执行文件可用
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let binary = config.binary_path.as_deref().unwrap_or("tesseract");
        let version = get_tesseract_version(binary)?;

        log::info!("[Tesseract] 初始化成功，版本: {}", version);

        Ok(Self { config, version })
    }

    fn binary_path(&self) -> &str {
        self.config.binary_path.as_deref().unwrap_or("tesseract")
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 审计用的引擎参数快照（JSON）
    pub fn audit_params(&self, lang: &str) -> String {
        serde_json::json!({
            "lang": lang,
            "psm": self.config.psm_or_default(),
            "oem": self.config.oem_or_default(),
        })
        .to_string()
    }
}

impl OcrEngine for TesseractEngine {
    fn detect_tokens(&mut self, img: &DynamicImage, lang: &str) -> Result<Vec<Token>, OcrError> {
        let start = Instant::now();

        // 写入临时文件供 CLI 读取；流水线串行，按进程号命名即可
        let temp_input =
            std::env::temp_dir().join(format!("cellmask_ocr_{}.png", std::process::id()));
        img.save(&temp_input)
            .map_err(|e| OcrError::ImageProcess(format!("保存临时图片失败: {}", e)))?;

        let mut cmd = Command::new(self.binary_path());
        cmd.arg(&temp_input)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string())
            .arg("tsv");

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }

        let output = cmd.output();
        let _ = std::fs::remove_file(&temp_input);

        let output = output.map_err(|e| OcrError::Oracle(format!("执行 tesseract 失败: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Oracle(format!(
                "tesseract 退出码非零: {}",
                stderr.trim()
            )));
        }

        let tokens = parse_tesseract_tsv(&String::from_utf8_lossy(&output.stdout))?;

        log::info!(
            "[Tesseract] 识别完成，耗时: {} ms，token 数: {}",
            start.elapsed().as_millis(),
            tokens.len()
        );

        Ok(tokens)
    }
}

/// 解析 Tesseract TSV 输出
///
/// TSV 格式：
/// level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
///
/// 只保留 word 级别 (level=5) 且文字非空的行；置信度原样保留，
/// 负置信度 token 由行重组阶段统一剔除。
fn parse_tesseract_tsv(tsv: &str) -> Result<Vec<Token>, OcrError> {
    let mut tokens = Vec::new();

    // 跳过表头
    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }

        let level: i32 = cols[0].parse().unwrap_or(-1);
        let text = cols[11].trim();
        if level != 5 || text.is_empty() {
            continue;
        }

        let key = LineKey::new(
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );
        let bbox = TokenBox {
            left: cols[6].parse().unwrap_or(0),
            top: cols[7].parse().unwrap_or(0),
            width: cols[8].parse().unwrap_or(0),
            height: cols[9].parse().unwrap_or(0),
        };
        let confidence: f32 = cols[10].parse().unwrap_or(-1.0);

        tokens.push(Token {
            text: text.to_string(),
            bbox,
            confidence,
            key,
        });
    }

    Ok(tokens)
}

/// 获取 Tesseract 版本
pub fn get_tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("无法执行 {}: {}", binary_path, e)))?;

    if !output.status.success() {
        return Err(OcrError::EngineUnavailable(
            "tesseract --version 执行失败".to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{}{}", stdout, stderr);

    // 版本号通常在第一行，形如 "tesseract 5.3.0" 或 "tesseract v5.3.0"
    for line in combined.lines() {
        if line.contains("tesseract") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 2 {
                return Ok(parts[1].trim_start_matches('v').to_string());
            }
        }
    }

    Ok("unknown".to_string())
}
