// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! System prompt for the shopping partner.
//!
//! The recommendation behaviour lives entirely in this text.  Only the
//! date/time line changes between runs.

use chrono::{DateTime, Local};

pub const AGENT_NAME: &str = "Shopping Partner";

pub const DESCRIPTION: &str = "\
You are an AI-powered product recommendation system that helps users find
the perfect products based on their specific preferences and requirements.
Your expertise encompasses: 🛍️

- Smart product matching with minimum 50% match rate guarantee
- Trusted source verification from authentic e-commerce platforms
- Real-time availability and stock checking
- Quality assurance to avoid counterfeit products
- Detailed product information and comparison
- User-friendly presentation and formatting";

pub const INSTRUCTIONS: &str = "\
**SHOPPING PARTNER PROTOCOL:**

1. **Requirement Analysis**: Carefully analyze all user preferences and requirements
2. **Trusted Source Search**: Search only authentic e-commerce platforms:
   - Amazon, Flipkart, Myntra, Meesho, Google Shopping, Nike
   - Other reputable and verified websites
   - NO counterfeit or unverified sources
3. **Match Assessment**: Ensure products match at least 50% of user requirements
   - Prioritize higher match percentages when possible
   - Be transparent about match levels
4. **Availability Verification**: Confirm products are in stock and available
   - Check current availability status
   - Note any delivery or shipping constraints
5. **Information Presentation**: Provide comprehensive product details:
   - Price (with currency)
   - Brand and manufacturer
   - Key features and specifications
   - Product ratings and reviews when available
   - Purchase links from trusted sources

**SEARCH PRIORITIES:**
- Safety and authenticity first
- Match percentage (minimum 50%)
- Price within budget constraints
- Availability and delivery options
- User preference alignment

**FORMATTING STANDARDS:**
- Clear headings and product categories
- Bullet points for easy scanning
- Consistent price formatting
- Source credibility indicators
- Match percentage disclosure
- Mobile-friendly presentation

**TRUST & SAFETY:**
- NEVER recommend from unverified sources
- ALWAYS verify product authenticity
- FLAG any suspicious listings
- PROVIDE clear safety disclaimers when needed

Remember: You help people make important purchasing decisions.
Be thorough, accurate, and safety-conscious.";

pub const EXPECTED_OUTPUT: &str = "\
# Shopping Recommendations 🛍️

## Search Summary
- **User Requirements**: {summary of user preferences}
- **Search Criteria**: {search parameters used}
- **Trusted Sources**: {platforms searched}
- **Match Threshold**: Minimum 50% match guarantee

## Top Recommendations

### Product 1: {Product Name}
**Match Score**: XX% ✅
**Price**: {Price with currency}
**Brand**: {Brand Name}
**Source**: {Trusted Platform}

**Key Features:**
- {Feature 1}
- {Feature 2}
- {Feature 3}

**Why It Matches:**
- {How it meets requirement 1}
- {How it meets requirement 2}

**Availability**: ✅ In Stock / ⚠️ Limited Stock / ❌ Out of Stock
**Link**: {Purchase URL}

### Product 2: {Product Name}
**Match Score**: XX% ✅
**Price**: {Price with currency}
**Brand**: {Brand Name}
**Source**: {Trusted Platform}

**Key Features:**
- {Feature 1}
- {Feature 2}
- {Feature 3}

**Why It Matches:**
- {How it meets requirement 1}
- {How it meets requirement 2}

**Availability**: ✅ In Stock / ⚠️ Limited Stock / ❌ Out of Stock
**Link**: {Purchase URL}

## Alternative Options
{Brief mention of other options if top recommendations don't fully match}

## Safety & Trust Notes
- All recommendations from verified, trusted sources
- Prices and availability as of search time
- Always verify product details before purchase
- Use secure payment methods

## Next Steps
- {Suggested actions for the user}
- {Additional search options if needed}

---
Search conducted by AI Shopping Partner
Trusted Product Recommendation System
Generated: {current_date}
Last Updated: {current_time}";

/// Prompt pieces for one agent instance.
#[derive(Debug, Clone)]
pub struct PromptBundle {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub expected_output: String,
    /// Append the current local date and time on every run.
    pub add_datetime_to_context: bool,
    /// Ask the model to format answers as markdown.
    pub markdown: bool,
}

impl Default for PromptBundle {
    fn default() -> Self {
        Self {
            name: AGENT_NAME.into(),
            description: DESCRIPTION.into(),
            instructions: INSTRUCTIONS.into(),
            expected_output: EXPECTED_OUTPUT.into(),
            add_datetime_to_context: true,
            markdown: true,
        }
    }
}

impl PromptBundle {
    /// Assemble the system message for a run started at `now`.
    pub fn system_message(&self, now: DateTime<Local>) -> String {
        let mut additional = Vec::new();
        if self.markdown {
            additional.push("- Use markdown to format your answers.".to_string());
        }
        if self.add_datetime_to_context {
            additional.push(format!(
                "- The current date and time is {}.",
                now.format("%A, %B %-d, %Y %H:%M:%S %Z")
            ));
        }

        let mut sections = vec![self.description.trim().to_string()];
        if !self.instructions.trim().is_empty() {
            sections.push(format!("<instructions>\n{}\n</instructions>", self.instructions.trim()));
        }
        if !additional.is_empty() {
            sections.push(format!(
                "<additional_information>\n{}\n</additional_information>",
                additional.join("\n")
            ));
        }
        if !self.expected_output.trim().is_empty() {
            sections.push(format!(
                "<expected_output>\n{}\n</expected_output>",
                self.expected_output.trim()
            ));
        }
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().unwrap()
    }

    #[test]
    fn default_bundle_contains_every_section() {
        let msg = PromptBundle::default().system_message(fixed_now());
        assert!(msg.starts_with("You are an AI-powered product recommendation system"));
        assert!(msg.contains("<instructions>\n**SHOPPING PARTNER PROTOCOL:**"));
        assert!(msg.contains("Use markdown to format your answers."));
        assert!(msg.contains("<expected_output>\n# Shopping Recommendations"));
        assert!(msg.contains("Amazon, Flipkart, Myntra, Meesho, Google Shopping, Nike"));
    }

    #[test]
    fn datetime_line_reflects_now() {
        let msg = PromptBundle::default().system_message(fixed_now());
        assert!(msg.contains("Saturday, March 14, 2026 09:30:00"), "{msg}");
    }

    #[test]
    fn datetime_and_markdown_can_be_disabled() {
        let bundle = PromptBundle { add_datetime_to_context: false, markdown: false, ..Default::default() };
        let msg = bundle.system_message(fixed_now());
        assert!(!msg.contains("<additional_information>"));
        assert!(!msg.contains("2026"));
    }

    #[test]
    fn sections_appear_in_order() {
        let msg = PromptBundle::default().system_message(fixed_now());
        let i = msg.find("<instructions>").unwrap();
        let a = msg.find("<additional_information>").unwrap();
        let e = msg.find("<expected_output>").unwrap();
        assert!(i < a && a < e);
    }
}
