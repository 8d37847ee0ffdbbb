//! # Console 模块
//!
//! 纯文本表现层：把对话、名牌、选项与背景变化写成文字记录。
//!
//! 文本整行输出，逐字显示只体现在计时上（[`Typewriter`]）。

use novel_stage::{Presentation, Typewriter};

/// 控制台表现层
#[derive(Debug)]
pub struct ConsolePresentation {
    /// 尚未输出的行
    pending: Vec<String>,
    speaker: Option<String>,
    choices: Vec<String>,
    typewriter: Typewriter,
}

impl ConsolePresentation {
    pub fn new(chars_per_second: f32) -> Self {
        Self {
            pending: Vec::new(),
            speaker: None,
            choices: Vec::new(),
            typewriter: Typewriter::new(chars_per_second),
        }
    }

    /// 取走待输出的行
    pub fn drain_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// 当前展示的选项
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// 当前说话人
    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }
}

impl Presentation for ConsolePresentation {
    fn reveal_text(&mut self, content: &str) {
        let line = match &self.speaker {
            Some(name) => format!("【{name}】{content}"),
            None => content.to_string(),
        };
        self.pending.push(line);
        self.typewriter.start(content);
    }

    fn reveal_finished(&self) -> bool {
        self.typewriter.is_finished()
    }

    fn complete_reveal_now(&mut self) {
        self.typewriter.complete();
    }

    fn show_speaker_name(&mut self, name: Option<&str>) {
        self.speaker = name.map(str::to_string);
    }

    fn present_choices(&mut self, choices: &[String]) {
        self.choices = choices.to_vec();
        for (i, text) in choices.iter().enumerate() {
            self.pending.push(format!("  {}. {}", i + 1, text));
        }
    }

    fn clear_choices(&mut self) {
        self.choices.clear();
    }

    fn show_background(&mut self, file: &str) {
        self.pending.push(format!("〔背景：{file}〕"));
    }

    fn update(&mut self, dt: f32) {
        self.typewriter.update(dt);
    }
}
