//! 报告输出
//!
//! 标准输出只承载报告块和逐条失败诊断；运行日志走 tracing（stderr）

use serde_json::Value;
use std::io::{self, Write};

use crate::enrichment::Explanation;
use crate::error::ExplainerError;

/// 一条处理成功的告警
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub alert: Value,
    pub explanation: Explanation,
}

/// 报告写出器
pub struct Reporter<W: Write> {
    out: W,
    separator: String,
}

impl Reporter<io::Stdout> {
    pub fn stdout(separator_width: usize) -> Self {
        Self::new(io::stdout(), separator_width)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, separator_width: usize) -> Self {
        Self {
            out,
            separator: "=".repeat(separator_width),
        }
    }

    /// 写出报告块：格式化的告警 JSON、解释文本、分隔线
    pub fn report(&mut self, report: &Report) -> io::Result<()> {
        let pretty = serde_json::to_string_pretty(&report.alert).map_err(io::Error::other)?;
        writeln!(self.out, "Raw Alert:")?;
        writeln!(self.out, "{}", pretty)?;
        writeln!(self.out, "Explanation:")?;
        writeln!(self.out, "{}", report.explanation)?;
        writeln!(self.out, "{}", self.separator)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// 写出一行失败诊断
    pub fn failure(&mut self, error: &ExplainerError) -> io::Result<()> {
        // 诊断必须是单行，错误信息里的换行折叠为空格
        let message = error.to_string().replace(['\r', '\n'], " ");
        writeln!(self.out, "Failed to process message: {}", message)?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
