/// Prompt templates for guide generation and company research.
///
/// Rendering is pure: the same inputs always produce byte-identical text.
/// Every section label is always present; empty sections carry
/// [`NONE_PROVIDED`] so the generated guide sees a stable structure.
use glean_common::glean::SearchHit;

use crate::model::ResearchBundle;

pub const NONE_PROVIDED: &str = "None provided.";

/// Reference guide the model is asked to imitate.
const EXAMPLE_GUIDE: &str = r#"# IntelXLabs + Plaid // Solutions Guide

## What You're Building

HOA financial management platform that needs to:
- Connect bank accounts for business customers (HOAs)
- Import transaction data for accounting/reconciliation
- Integrate with Stripe for payments
- Keep sensitive data storage minimal for compliance

## Core Plaid Integration

### 1. Bank Account Connection (`Link` + `Auth`)
**What it does**: Secure bank account linking with account/routing number retrieval

**Customization**: Logo, colors, copy via dashboard templates

### 2. Stripe Integration (`Auth`)
**One extra API call** after account connection

### 3. Transaction Data (`Transactions`)
**Real-time transaction sync** for accounting features

## Key Technical Details

### Access Token Management
- **Tokens don't expire** (unless user changes bank password)
- Store encrypted in your backend only
- Get webhooks when tokens need updates
- Users can revoke via `/item/remove` endpoint

### Implementation Flow
1. HOA user clicks "Connect Bank Account"
2. Plaid Link opens (with your branding)
3. User authenticates with their bank
4. You get access_token
5. Generate Stripe processor token
6. Start syncing transaction data

## What You Get Out of the Box
✅ **Security**: SOC 2, PCI DSS, GDPR compliant
✅ **Bank Coverage**: 12,000+ US institutions
✅ **Webhooks**: Real-time account status updates
✅ **User Control**: Built-in consent and revocation

## Answers to Your Questions
[Table format with specific Q&A from the call]

## Getting Started
1. **Sandbox**: Test with fake banks
2. **Limited Production**: Real banks, capped API calls
3. **Production**: Full access after commercial agreement"#;

/// Render the guide-generation prompt.
///
/// `transcript` and `company_name` are embedded verbatim.
pub fn render(
    transcript: &str,
    company_name: &str,
    research: &ResearchBundle,
    additional_context: Option<&str>,
) -> String {
    let business_overview = or_none(research.business_overview.as_deref());
    let technical_context = or_none(research.technical_context.as_deref());
    let transcript_analysis = or_none(research.transcript_analysis.as_deref());
    let search_results = render_search_hits(&research.search_results);
    let additional_context = or_none(additional_context);

    format!(
        "You are an expert sales engineer creating technical solution guides for Plaid's financial APIs.

Your task is to analyze this call transcript from {company_name} and generate a concise, technical \
solution guide that matches the style and format of the example provided.

## CALL TRANSCRIPT:
{transcript}

## COMPANY RESEARCH:
### Business Overview:
{business_overview}

### Technical Context:
{technical_context}

### Transcript Analysis:
{transcript_analysis}

### Search Results:
{search_results}

## ADDITIONAL CONTEXT:
{additional_context}

## EXAMPLE SOLUTION GUIDE STYLE:
{EXAMPLE_GUIDE}

## INSTRUCTIONS:
Generate a solution guide for {company_name} that follows these principles:

1. **Focus on technical implementation** - Include specific API calls, code examples, and integration flows
2. **Avoid business jargon** - Write for technical PMs who need actionable information
3. **Use clear, scannable formatting** - Tables, bullet points, code blocks, checkboxes
4. **Address specific questions** - Extract and answer questions raised in the call transcript
5. **Provide actionable next steps** - Clear implementation roadmap
6. **Match the tone and structure** - Concise, practical, technically focused like the example

## KEY REQUIREMENTS:
- Title format: \"{company_name} + Plaid // Solutions Guide\"
- Start with \"What You're Building\" section describing their specific use case
- Include \"Core Integration\" section with specific Plaid products needed
- Add \"Key Technical Details\" with implementation specifics
- Include \"What You Get Out of the Box\" with relevant benefits
- Create \"Answers to Your Questions\" section addressing call discussion points
- End with \"Getting Started\" steps

## OUTPUT:
Generate the complete solution guide for {company_name} now, following the exact style and \
structure of the example:"
    )
}

/// Render the chat prompt that analyzes a transcript excerpt during research.
pub fn render_research(company_name: &str, transcript_excerpt: &str) -> String {
    format!(
        "Based on this call transcript excerpt from {company_name}, help me understand their \
business and technical requirements:

TRANSCRIPT EXCERPT:
{transcript_excerpt}

Please provide:
1. What industry/sector is {company_name} in?
2. What is their business model and primary products/services?
3. What technical challenges might they face?
4. What integration requirements should we consider?
5. Who are their likely customers/users?

Focus on information that would help create a targeted technical solution guide."
    )
}

fn or_none(text: Option<&str>) -> &str {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NONE_PROVIDED)
}

fn render_search_hits(hits: &[SearchHit]) -> String {
    let lines: Vec<String> = hits.iter().filter_map(render_search_hit).collect();
    if lines.is_empty() {
        NONE_PROVIDED.to_string()
    } else {
        lines.join("\n")
    }
}

fn render_search_hit(hit: &SearchHit) -> Option<String> {
    let title = hit.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let url = hit.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let snippet = hit.snippet.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let head = match (title, url) {
        (Some(title), Some(url)) => Some(format!("{title} ({url})")),
        (Some(title), None) => Some(title.to_string()),
        (None, Some(url)) => Some(url.to_string()),
        (None, None) => None,
    };
    match (head, snippet) {
        (Some(head), Some(snippet)) => Some(format!("- {head}: {snippet}")),
        (Some(head), None) => Some(format!("- {head}")),
        (None, Some(snippet)) => Some(format!("- {snippet}")),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn research() -> ResearchBundle {
        ResearchBundle {
            business_overview: Some("Acme sells anvils to coyotes.".to_string()),
            technical_context: Some("  ".to_string()),
            search_results: vec![
                SearchHit {
                    title: Some("Acme 10-K".to_string()),
                    url: Some("https://acme.example.com/10k".to_string()),
                    snippet: Some("Revenue grew".to_string()),
                },
                SearchHit::default(),
                SearchHit {
                    title: None,
                    url: None,
                    snippet: Some("orphan snippet".to_string()),
                },
            ],
            ..ResearchBundle::empty("Acme")
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let bundle = research();
        let a = render("We need ACH transfers", "Acme", &bundle, Some("HOA platform"));
        let b = render("We need ACH transfers", "Acme", &bundle, Some("HOA platform"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_embeds_inputs_verbatim() {
        let transcript = "  Speaker 1: We need ACH transfers.\n\nSpeaker 2: Sure.  ";
        let prompt = render(transcript, "Acme, Inc.", &research(), None);
        assert!(prompt.contains(transcript));
        assert!(prompt.contains("Acme, Inc."));
        assert!(prompt.contains("\"Acme, Inc. + Plaid // Solutions Guide\""));
    }

    #[test]
    fn test_render_marks_missing_context() {
        let prompt = render("t", "Acme", &research(), None);
        assert!(prompt.contains(&format!("## ADDITIONAL CONTEXT:\n{NONE_PROVIDED}")));

        let prompt = render("t", "Acme", &research(), Some("HOA platform"));
        assert!(prompt.contains("## ADDITIONAL CONTEXT:\nHOA platform"));
    }

    #[test]
    fn test_render_keeps_every_section_for_empty_research() {
        let prompt = render("t", "Acme", &ResearchBundle::empty("Acme"), None);
        for label in [
            "## CALL TRANSCRIPT:",
            "## COMPANY RESEARCH:",
            "## EXAMPLE SOLUTION GUIDE STYLE:",
            "## INSTRUCTIONS:",
            "## KEY REQUIREMENTS:",
            "## OUTPUT:",
        ] {
            assert!(prompt.contains(label), "missing section {label}");
        }
        for label in [
            "### Business Overview:",
            "### Technical Context:",
            "### Transcript Analysis:",
            "### Search Results:",
            "## ADDITIONAL CONTEXT:",
        ] {
            assert!(
                prompt.contains(&format!("{label}\n{NONE_PROVIDED}")),
                "section {label} should be marked empty"
            );
        }
    }

    #[test]
    fn test_render_research_sections() {
        let prompt = render("t", "Acme", &research(), None);
        assert!(prompt.contains("### Business Overview:\nAcme sells anvils to coyotes."));
        assert!(prompt.contains(&format!("### Technical Context:\n{NONE_PROVIDED}")));
        assert!(prompt.contains(
            "### Search Results:\n- Acme 10-K (https://acme.example.com/10k): Revenue grew\n- orphan snippet\n"
        ));
    }

    #[test]
    fn test_render_research_prompt() {
        let prompt = render_research("Acme", "We need ACH...");
        assert!(prompt.contains("TRANSCRIPT EXCERPT:\nWe need ACH...\n"));
        assert!(prompt.contains("What industry/sector is Acme in?"));
    }
}
