use attend_core::model::AttendanceRecord;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant providing personalized tips to students to improve their attendance. \
Reply with a single specific and actionable tip, with no preamble.";

/// User message asking for one tip about a single subject.
#[must_use]
pub fn render_tip_prompt(record: &AttendanceRecord) -> String {
    format!(
        "Consider the following attendance data for a subject:\n\
         Subject: {}\n\
         Attended Classes: {}\n\
         Total Classes: {}\n\
         Target Attendance: {}%\n\n\
         Generate one specific and actionable tip to improve attendance in this subject.",
        record.subject, record.attended, record.total, record.target_attendance
    )
}
