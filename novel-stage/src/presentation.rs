//! # Presentation 模块
//!
//! 文本框、说话人名牌、选项列表与背景的抽象，由宿主实现。
//!
//! [`Typewriter`] 是逐字显示的计时器，宿主可以直接复用。

/// 表现层
pub trait Presentation {
    /// 开始逐字显示文本
    fn reveal_text(&mut self, content: &str);

    /// 当前文本是否已完全显示
    fn reveal_finished(&self) -> bool;

    /// 立即显示完整文本
    fn complete_reveal_now(&mut self);

    /// 显示或隐藏说话人名牌
    fn show_speaker_name(&mut self, name: Option<&str>);

    /// 展示选项
    fn present_choices(&mut self, choices: &[String]);

    /// 移除选项
    fn clear_choices(&mut self);

    /// 切换背景
    fn show_background(&mut self, file: &str);

    /// 推进时间（秒）
    fn update(&mut self, _dt: f32) {}
}

/// 打字机计时器
#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    content: String,
    total_chars: usize,
    visible_chars: usize,
    timer: f32,
    chars_per_second: f32,
}

impl Typewriter {
    /// 创建打字机（`chars_per_second` ≤ 0 时立即显示全部）
    pub fn new(chars_per_second: f32) -> Self {
        Self {
            chars_per_second,
            ..Default::default()
        }
    }

    /// 开始显示新文本
    pub fn start(&mut self, content: &str) {
        self.content = content.to_string();
        self.total_chars = content.chars().count();
        self.visible_chars = 0;
        self.timer = 0.0;
        if self.chars_per_second <= 0.0 {
            self.complete();
        }
    }

    /// 推进时间，返回是否已完成
    pub fn update(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return true;
        }
        self.timer += dt * self.chars_per_second;
        while self.timer >= 1.0 && self.visible_chars < self.total_chars {
            self.timer -= 1.0;
            self.visible_chars += 1;
        }
        self.is_finished()
    }

    /// 立即显示全部
    pub fn complete(&mut self) {
        self.visible_chars = self.total_chars;
        self.timer = 0.0;
    }

    /// 是否已完全显示
    pub fn is_finished(&self) -> bool {
        self.visible_chars >= self.total_chars
    }

    /// 当前可见的文本
    pub fn visible_text(&self) -> String {
        self.content.chars().take(self.visible_chars).collect()
    }

    /// 完整文本
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typewriter_reveals_over_time() {
        let mut tw = Typewriter::new(10.0);
        tw.start("你好世界");
        assert_eq!(tw.visible_text(), "");

        assert!(!tw.update(0.25));
        assert_eq!(tw.visible_text(), "你好");

        assert!(tw.update(1.0));
        assert_eq!(tw.visible_text(), "你好世界");
    }

    #[test]
    fn test_typewriter_complete() {
        let mut tw = Typewriter::new(1.0);
        tw.start("abc");
        tw.complete();
        assert!(tw.is_finished());
        assert_eq!(tw.visible_text(), "abc");
    }

    #[test]
    fn test_zero_speed_is_instant() {
        let mut tw = Typewriter::new(0.0);
        tw.start("abc");
        assert!(tw.is_finished());
        assert_eq!(tw.content(), "abc");
    }
}
