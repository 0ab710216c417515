//! Skill markdown parsing (spec §4.3 inputs): the raw goal/body text plus
//! the three known H2 history sections (`## Success Cases`, `## Failure
//! Cases`, `## Operator Feedback`). Grounded on the teacher's
//! `csa-todo::dag::from_markdown` line-walking idiom — track the current
//! section by heading, accumulate lines into it — adapted from checkbox
//! parsing to free-form history-entry accumulation.

const SUCCESS_CASES_HEADING: &str = "Success Cases";
const FAILURE_CASES_HEADING: &str = "Failure Cases";
const OPERATOR_FEEDBACK_HEADING: &str = "Operator Feedback";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillDocument {
    /// Everything before the first known H2 heading: the goal statement
    /// and any free-form domain description.
    pub body: String,
    pub success_cases: Vec<String>,
    pub failure_cases: Vec<String>,
    pub operator_feedback: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Success,
    Failure,
    Feedback,
    Other,
}

impl SkillDocument {
    pub fn parse(raw: &str) -> Self {
        let mut body_lines: Vec<&str> = Vec::new();
        let mut success_blocks: Vec<Vec<&str>> = Vec::new();
        let mut failure_blocks: Vec<Vec<&str>> = Vec::new();
        let mut feedback_blocks: Vec<Vec<&str>> = Vec::new();

        let mut section = Section::Body;
        let mut current_block: Vec<&str> = Vec::new();

        for line in raw.lines() {
            if let Some(heading) = parse_h2_heading(line) {
                flush_block(section, &mut current_block, &mut success_blocks, &mut failure_blocks, &mut feedback_blocks);
                section = classify_heading(heading);
                continue;
            }

            if let Some(entry_heading) = parse_h3_heading(line) {
                if section != Section::Body && section != Section::Other {
                    flush_block(section, &mut current_block, &mut success_blocks, &mut failure_blocks, &mut feedback_blocks);
                    current_block.push(entry_heading_line(entry_heading));
                    continue;
                }
            }

            match section {
                Section::Body => body_lines.push(line),
                Section::Success | Section::Failure | Section::Feedback => current_block.push(line),
                Section::Other => {}
            }
        }
        flush_block(section, &mut current_block, &mut success_blocks, &mut failure_blocks, &mut feedback_blocks);

        Self {
            body: body_lines.join("\n").trim().to_string(),
            success_cases: join_blocks(success_blocks),
            failure_cases: join_blocks(failure_blocks),
            operator_feedback: join_blocks(feedback_blocks),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

fn entry_heading_line(heading: &str) -> &str {
    // Store a synthetic marker so the joined block keeps the `### [...]`
    // line the Orchestrator wrote; borrowed lifetime matches the source.
    heading
}

fn flush_block<'a>(
    section: Section,
    current: &mut Vec<&'a str>,
    success: &mut Vec<Vec<&'a str>>,
    failure: &mut Vec<Vec<&'a str>>,
    feedback: &mut Vec<Vec<&'a str>>,
) {
    if current.is_empty() {
        return;
    }
    let block = std::mem::take(current);
    match section {
        Section::Success => success.push(block),
        Section::Failure => failure.push(block),
        Section::Feedback => feedback.push(block),
        _ => {}
    }
}

fn join_blocks(blocks: Vec<Vec<&str>>) -> Vec<String> {
    blocks
        .into_iter()
        .map(|block| block.join("\n").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_h2_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix("## ").map(str::trim)
}

fn parse_h3_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix("### ").map(str::trim)
}

fn classify_heading(heading: &str) -> Section {
    if heading.eq_ignore_ascii_case(SUCCESS_CASES_HEADING) {
        Section::Success
    } else if heading.eq_ignore_ascii_case(FAILURE_CASES_HEADING) {
        Section::Failure
    } else if heading.eq_ignore_ascii_case(OPERATOR_FEEDBACK_HEADING) {
        Section::Feedback
    } else {
        Section::Other
    }
}
