//! # Config 模块
//!
//! 舞台表现参数：文字速度与角色动画时长/布局尺寸。

use serde::{Deserialize, Serialize};

/// 舞台配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// 文字显示速度（字/秒）
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f32,

    /// 角色入场/退场时长（秒）
    #[serde(default = "default_actor_duration")]
    pub actor_duration: f32,

    /// 角色布局槽宽度
    #[serde(default = "default_actor_width")]
    pub actor_width: f32,

    /// 入场/退场移动距离
    #[serde(default = "default_move_distance")]
    pub move_distance: f32,

    /// 文字显示完成（或被点击完成）后立即推进
    ///
    /// 关闭后为点击继续：显示完成后等待下一次点击。
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
}

fn default_chars_per_second() -> f32 {
    45.0
}

fn default_actor_duration() -> f32 {
    0.5
}

fn default_actor_width() -> f32 {
    350.0
}

fn default_move_distance() -> f32 {
    800.0
}

fn default_auto_advance() -> bool {
    true
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            chars_per_second: default_chars_per_second(),
            actor_duration: default_actor_duration(),
            actor_width: default_actor_width(),
            move_distance: default_move_distance(),
            auto_advance: default_auto_advance(),
        }
    }
}

impl StageConfig {
    /// 显示 `chars` 个字符所需的时间（秒）
    pub fn reveal_duration(&self, chars: usize) -> f32 {
        if self.chars_per_second <= 0.0 {
            return 0.0;
        }
        chars as f32 / self.chars_per_second
    }
}
