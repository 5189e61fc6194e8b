//! cellmask 入口
//!
//! 流程：构建模式集 → 初始化 OCR 引擎 → 提取工作簿嵌入图片 →
//! 逐张遮盖（串行，首个致命错误中止整批）→ 全部成功后写出
//! 工作簿副本 → 可选的 JSON 元数据汇总。

mod cli;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use cellmask_core::{file_sha256, mask_image_file, ImageReport, MaskConfig, OracleAudit};
use cellmask_ocr::{TesseractConfig, TesseractEngine};
use cellmask_rules::PatternSet;
use cellmask_xlsx::{extract_images, write_masked_images};

use cli::Cli;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logger(&args);

    let patterns = build_pattern_set(&args).context("构建敏感模式集失败")?;
    log::info!("[CLI] 模式集共 {} 条", patterns.len());

    let cfg = MaskConfig {
        lang: args.lang.clone(),
        mask_padding: args.mask_padding,
        tesseract_cmd: args.tesseract_cmd.clone(),
        ..MaskConfig::default()
    };

    let mut engine = TesseractEngine::new(TesseractConfig {
        binary_path: cfg.tesseract_cmd.clone(),
        ..TesseractConfig::default()
    })
    .context("初始化 Tesseract 引擎失败")?;

    println!("正在从工作簿提取图片...");
    let sheets = args.selected_sheets();
    let extracted = extract_images(&args.input, sheets.as_deref())
        .with_context(|| format!("读取工作簿 {} 失败", args.input.display()))?;
    println!("发现 {} 张嵌入图片", extracted.len());

    let mut replacements: HashMap<String, PathBuf> = HashMap::new();
    let mut reports: Vec<ImageReport> = Vec::new();

    for item in &extracted {
        let placement = &item.placement;
        let input_sha256 = file_sha256(&item.image_path)
            .with_context(|| format!("读取图片 {} 失败", placement.image_id))?;

        let masked = mask_image_file(&item.image_path, &mut engine, &patterns, &cfg)
            .with_context(|| format!("处理图片 {} 失败", placement.image_id))?;

        println!(
            "已遮盖 {}: {} 个区域",
            placement.image_id,
            masked.redactions.len()
        );

        replacements.insert(placement.media_part.clone(), masked.out_path.clone());
        reports.push(ImageReport {
            image_id: placement.image_id.clone(),
            sheet: placement.sheet_name.clone(),
            cell: placement.cell.clone(),
            original: item.image_path.display().to_string(),
            masked: masked.out_path.display().to_string(),
            redactions: masked.redactions,
            ocr_text: masked.transcript,
            audit: OracleAudit {
                engine: "tesseract".to_string(),
                version: Some(engine.version().to_string()),
                params: Some(engine.audit_params(&cfg.lang)),
                input_sha256,
                masked_at: Utc::now(),
            },
        });
    }

    // 全部图片遮盖成功后才落盘，不写半成品工作簿
    println!("正在把遮盖后的图片写回工作簿...");
    write_masked_images(&args.input, &args.output, &replacements)
        .with_context(|| format!("写出工作簿 {} 失败", args.output.display()))?;
    println!("已写出 {}", args.output.display());

    if let Some(path) = &args.dump_json {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json)
            .with_context(|| format!("写出元数据 {} 失败", path.display()))?;
        println!("元数据已写入 {}", path.display());
    }

    Ok(())
}

fn init_logger(args: &Cli) {
    let level = if args.quiet {
        log::LevelFilter::Off
    } else if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

/// 按优先级构建模式集：模式文件 > 显式正则 > 头名文件 > 头名 > 默认
fn build_pattern_set(args: &Cli) -> Result<PatternSet> {
    let set = if let Some(path) = &args.patterns_file {
        PatternSet::from_file(path)?
    } else if let Some(patterns) = &args.patterns {
        PatternSet::from_strings(split_csv(patterns))?
    } else if let Some(path) = &args.headers_file {
        PatternSet::from_headers_file(path, args.include_default_headers)?
    } else if let Some(headers) = &args.headers {
        PatternSet::from_headers(split_csv(headers), args.include_default_headers)?
    } else {
        PatternSet::defaults()?
    };
    Ok(set)
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
