//! 处理选项
//!
//! `OptionsForm` 是用户填写的原始表单，`ProcessingOptions` 是提交时捕获的只读快照。
//! 表单中被隐藏的字段不会进入快照：
//! - 无损格式（wav / flac）只发送位深，有损格式只发送码率
//! - 抖动只在无损 16 位时生效，否则为 `none`
//! - 重采样器只在无损格式时生效，否则为 `swr`
//! - 自定义响度只在 `custom` 预设下生效，其他预设强制开启真峰值限制

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// 响度预设对应的目标 LUFS（仅用于展示）
pub static LUFS_PRESETS: phf::Map<&'static str, f64> = phf_map! {
    "spotify" => -14.0,
    "apple_music" => -16.0,
    "youtube" => -14.0,
};

/// 自定义响度预设的名称
pub const CUSTOM_PRESET: &str = "custom";

/// 判断输出格式是否为无损格式
pub fn is_lossless(format: &str) -> bool {
    matches!(format, "wav" | "flac")
}

/// 用户填写的处理选项表单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsForm {
    pub format: String,
    pub bitrate: String,
    pub bit_depth: String,
    pub sample_rate: String,
    pub lufs_preset: String,
    pub normalize: bool,
    pub target_lufs: String,
    pub limit_true_peak: bool,
    pub dither_method: String,
    pub resampler: String,
    pub trim_silence: bool,
    pub fade_enabled: bool,
    pub fade_in: String,
    pub fade_out: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub track_number: String,
    pub isrc: String,
}

impl Default for OptionsForm {
    fn default() -> Self {
        Self {
            format: "wav".to_string(),
            bitrate: "320".to_string(),
            bit_depth: "24".to_string(),
            sample_rate: "44100".to_string(),
            lufs_preset: "spotify".to_string(),
            normalize: false,
            target_lufs: "-14".to_string(),
            limit_true_peak: true,
            dither_method: "triangular".to_string(),
            resampler: "swr".to_string(),
            trim_silence: false,
            fade_enabled: false,
            fade_in: "1".to_string(),
            fade_out: "1".to_string(),
            artist: String::new(),
            album: String::new(),
            title: String::new(),
            track_number: String::new(),
            isrc: String::new(),
        }
    }
}

/// 提交时捕获的处理选项快照，同一批次的所有文件共享
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub format: String,
    pub bitrate: Option<String>,
    pub bit_depth: Option<String>,
    pub sample_rate: String,
    pub lufs_preset: String,
    pub normalize: bool,
    pub target_lufs: Option<String>,
    pub limit_true_peak: bool,
    pub dither_method: String,
    pub resampler: String,
    pub trim_silence: bool,
    pub fade_in: Option<String>,
    pub fade_out: Option<String>,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub track_number: String,
    pub isrc: String,
}

impl ProcessingOptions {
    /// 按表单可见性规则生成快照
    pub fn from_form(form: &OptionsForm) -> Self {
        let lossless = is_lossless(&form.format);
        let custom = form.lufs_preset == CUSTOM_PRESET;
        let normalize = custom && form.normalize;

        Self {
            format: form.format.clone(),
            bitrate: (!lossless).then(|| form.bitrate.clone()),
            bit_depth: lossless.then(|| form.bit_depth.clone()),
            sample_rate: form.sample_rate.clone(),
            lufs_preset: form.lufs_preset.clone(),
            normalize,
            target_lufs: normalize.then(|| form.target_lufs.clone()),
            limit_true_peak: if custom { form.limit_true_peak } else { true },
            dither_method: if lossless && form.bit_depth == "16" {
                form.dither_method.clone()
            } else {
                "none".to_string()
            },
            resampler: if lossless {
                form.resampler.clone()
            } else {
                "swr".to_string()
            },
            trim_silence: form.trim_silence,
            fade_in: form.fade_enabled.then(|| form.fade_in.clone()),
            fade_out: form.fade_enabled.then(|| form.fade_out.clone()),
            artist: form.artist.clone(),
            album: form.album.clone(),
            title: form.title.clone(),
            track_number: form.track_number.clone(),
            isrc: form.isrc.clone(),
        }
    }

    /// 本次处理的目标响度（预设值或自定义值）
    pub fn effective_target_lufs(&self) -> Option<f64> {
        if self.lufs_preset == CUSTOM_PRESET {
            self.target_lufs.as_deref().and_then(|v| v.trim().parse().ok())
        } else {
            LUFS_PRESETS.get(self.lufs_preset.as_str()).copied()
        }
    }
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self::from_form(&OptionsForm::default())
    }
}
