//! When conversations are started: hour of day, weekday and day of month.

use std::io::{self, Write};

use chrono::{Datelike, Timelike};
use tracing::debug;

use crate::config::ReportZone;
use crate::types::ConversationRecord;

pub const WEEKDAY_LABELS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Creation-time histograms. Weekday 0 is Monday, day 0 is the 1st.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeDistribution {
    pub hours: [u32; 24],
    pub weekdays: [u32; 7],
    pub days: [u32; 31],
    /// Conversations that contributed a timestamp.
    pub counted: usize,
}

impl TimeDistribution {
    /// Bucket every conversation that has a creation time.
    pub fn collect(conversations: &[ConversationRecord], zone: ReportZone) -> Self {
        let mut dist = Self::default();
        for conversation in conversations {
            let ts = conversation.created();
            if ts == 0.0 {
                continue;
            }
            let Some(dt) = zone.localize(ts) else {
                debug!(ts, "creation time out of range");
                continue;
            };
            dist.hours[dt.hour() as usize] += 1;
            dist.weekdays[dt.weekday().num_days_from_monday() as usize] += 1;
            dist.days[dt.day0() as usize] += 1;
            dist.counted += 1;
        }
        dist
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n=== 对话时间分布分析 ===")?;

        writeln!(out, "\n1. 24小时分布:")?;
        for (hour, count) in self.hours.iter().enumerate() {
            writeln!(out, "{hour:02}:00 - {hour:02}:59: {count}次")?;
        }

        writeln!(out, "\n2. 星期分布:")?;
        for (label, count) in WEEKDAY_LABELS.iter().zip(self.weekdays) {
            writeln!(out, "{label}: {count}次")?;
        }

        writeln!(out, "\n3. 日期分布:")?;
        for (day, count) in self.days.iter().enumerate() {
            if *count > 0 {
                writeln!(out, "{}日: {count}次", day + 1)?;
            }
        }
        Ok(())
    }
}

/// Full time-distribution report, or a notice when there is nothing to count.
pub fn write_time_patterns<W: Write>(
    out: &mut W,
    conversations: &[ConversationRecord],
    zone: ReportZone,
) -> io::Result<()> {
    if conversations.is_empty() {
        return writeln!(out, "对话列表为空");
    }
    let dist = TimeDistribution::collect(conversations, zone);
    debug!(
        counted = dist.counted,
        total = conversations.len(),
        "bucketed creation times"
    );
    dist.write_report(out)
}
