use std::fmt::Write as _;

use super::{OUTPUT_FORMAT_REQUIREMENT, PromptContext, persona_header};

const NO_CONTEXT: &str = "No specific real-time data was fetched or available for this query.";

fn or_default_list(values: &[String], default: &[&str]) -> Vec<String> {
    if values.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        values.to_vec()
    }
}

fn context_or<'a>(ctx: &PromptContext<'a>, fallback: &'a str) -> &'a str {
    if ctx.search_context.trim().is_empty() {
        fallback
    } else {
        ctx.search_context
    }
}

fn open(ctx: &PromptContext<'_>, task: &str) -> String {
    let mut prompt = persona_header(ctx.today);
    prompt.push_str("\n\n");
    let _ = writeln!(prompt, "**Task:** {task}");
    let _ = writeln!(prompt, "**User Query:** \"{}\"", ctx.original_query);
    prompt
}

fn close(mut prompt: String) -> String {
    prompt.push('\n');
    prompt.push_str(OUTPUT_FORMAT_REQUIREMENT);
    prompt.push('\n');
    prompt
}

fn full_profile(ctx: &PromptContext<'_>) -> String {
    let p = ctx.profile;
    format!(
        "Our Company: '{}', Industry: '{}', Size: '{}', Core Products: {}",
        p.company_name,
        p.industry,
        p.size,
        p.core_products()
    )
}

fn short_profile(ctx: &PromptContext<'_>, industry: &str) -> String {
    let p = ctx.profile;
    format!(
        "Our Company: '{}', Industry: '{}', Size: '{}'",
        p.company_name, industry, p.size
    )
}

fn push_lines(prompt: &mut String, lines: &[&str]) {
    for line in lines {
        prompt.push_str(line);
        prompt.push('\n');
    }
}

pub(super) fn competitive_analysis(ctx: &PromptContext<'_>) -> String {
    let entities = ctx.entities;
    let focus_areas = or_default_list(
        &entities.focus_areas,
        &[
            "Overall Strategy",
            "Products/Services",
            "Pricing",
            "Market Positioning",
            "Strengths",
            "Weaknesses",
        ],
    );
    let competitors = if entities.competitors.is_empty() {
        "General market competitors".to_string()
    } else {
        entities.competitors.join(", ")
    };

    let mut prompt = open(
        ctx,
        "Conduct a detailed competitive analysis based on the user query and recent information.",
    );
    let _ = writeln!(prompt, "**Our Business Profile:** {}", full_profile(ctx));
    let _ = writeln!(prompt, "**Competitors Identified:** {competitors}");
    let _ = writeln!(prompt, "**Specific Focus Areas:** {}\n", focus_areas.join(", "));

    prompt.push_str("**Recent Information Context (from web searches):**\n");
    let _ = writeln!(prompt, "{}\n", context_or(ctx, NO_CONTEXT));

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive Analysis:**",
            "1.  **Executive Summary:** Start with a brief overview of the key findings and most critical strategic takeaways for OurCompany.",
            "2.  **Methodology:** Briefly state that the analysis is based on publicly available information, the provided search context, and general industry knowledge.",
            "3.  **Competitor Profiles:** For each identified competitor (and OurCompany), provide a concise profile covering:",
            "     * Key Offerings & Target Market",
            "     * Recent News/Developments (referencing search context where applicable)",
            "     * Perceived Strengths",
            "     * Perceived Weaknesses",
            "4.  **Comparative Analysis (Condensed Paragraph Format):** For each of the specified `focus_areas`, write a paragraph comparing OurCompany and the key competitors. Synthesize information from the search context and general knowledge. Analyze factors within these paragraphs such as:",
            "     * Product Features & Innovation Pace",
            "     * Pricing Tiers & Value Proposition",
            "     * Go-to-Market Strategy (Sales channels, Marketing approach)",
            "     * Customer Reviews & Brand Perception (cite search context if reviews were found)",
            "     * Estimated Market Share / Position (if discernible)",
            "5.  **SWOT Analysis (Derived):** Based *specifically* on the comparison above, generate a SWOT analysis (Strengths, Weaknesses, Opportunities, Threats) for OurCompany relative to these competitors.",
            "6.  **Strategic Differentiators & Actionable Recommendations:** This is the most critical section. Provide concrete, actionable recommendations for OurCompany. Focus on:",
            "     * How to leverage strengths and mitigate weaknesses.",
            "     * How to capitalize on opportunities and defend against threats.",
            "     * Suggest specific strategic differentiators (e.g., focus on a niche, enhance a specific feature, improve support, adjust pricing, form partnerships).",
            "     * Consider feasibility for a mid-size enterprise (resource constraints).",
            "     * Suggest 1-2 key metrics (KPIs) to track progress if these recommendations are implemented.",
        ],
    );

    close(prompt)
}

pub(super) fn trend_forecasting(ctx: &PromptContext<'_>) -> String {
    let entities = ctx.entities;
    let industry = entities
        .industry
        .as_deref()
        .unwrap_or(&ctx.profile.industry);
    let time_horizon = entities.time_horizon.as_deref().unwrap_or("next 1-3 years");
    let focus_areas = or_default_list(
        &entities.focus_areas,
        &[
            "Technology",
            "Market Dynamics",
            "Customer Behavior",
            "Regulatory Changes",
        ],
    );

    let mut prompt = open(
        ctx,
        "Provide a detailed trend analysis and forecast for the specified industry, focusing on implications for a mid-size enterprise.",
    );
    let _ = writeln!(
        prompt,
        "**Our Business Profile Context:** {}",
        short_profile(ctx, industry)
    );
    let _ = writeln!(prompt, "**Industry Focus:** {industry}");
    let _ = writeln!(prompt, "**Time Horizon:** {time_horizon}");
    if let Some(geography) = entities.geography.as_deref() {
        let _ = writeln!(prompt, "**Geographic Focus:** {geography}");
    }
    let _ = writeln!(prompt, "**Specific Focus Areas:** {}\n", focus_areas.join(", "));

    prompt.push_str("**Recent Information Context (from web searches):**\n");
    let _ = writeln!(prompt, "{}\n", context_or(ctx, NO_CONTEXT));

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive Analysis:**",
            "1.  **Executive Summary:** Briefly summarize the most impactful trends identified and the overall strategic outlook for a mid-size player in this industry over the time horizon.",
            "2.  **Methodology:** State that the analysis uses recent public data (including provided search context), general industry knowledge, and forecasting principles.",
            "3.  **Key Trend Analysis:** For each major trend identified (use the `focus_areas` and search context as guides), provide:",
            "     * **Trend Description:** Clearly define the trend.",
            "     * **Evidence/Signals:** Mention supporting data points (from search context or general knowledge).",
            "     * **Impact Analysis:** Analyze the potential positive and negative impacts specifically on a *mid-size enterprise* like OurCompany within this industry. Consider resource constraints and agility.",
            "     * **Forecast & Likelihood:** Briefly forecast the trend's likely evolution over the specified `time_horizon`. You can optionally add a qualitative likelihood (e.g., High, Medium, Low).",
            "     * **Categorization (Optional but helpful):** Tag the trend (e.g., Technology, Market, Social, Regulatory/Legal, Environmental).",
            "4.  **Cross-Trend Synergies/Conflicts:** Briefly discuss any notable interactions between the identified trends.",
            "5.  **Strategic Implications & Actionable Recommendations:** Provide concrete, prioritized recommendations for OurCompany:",
            "     * How to leverage opportunities presented by trends.",
            "     * How to mitigate risks posed by trends.",
            "     * Suggest specific initiatives (e.g., technology adoption, market repositioning, partnership strategies, talent development).",
            "     * Frame recommendations considering mid-size company resources (avoid suggesting massive R&D unless critical).",
            "     * Recommend 1-2 KPIs per major recommendation area to track adaptation and success.",
        ],
    );

    close(prompt)
}

pub(super) fn swot_analysis(ctx: &PromptContext<'_>) -> String {
    let focus = or_default_list(&ctx.entities.focus_areas, &["overall business"]);

    let mut prompt = open(
        ctx,
        "Conduct a detailed SWOT analysis (Strengths, Weaknesses, Opportunities, Threats) for OurCompany.",
    );
    let _ = writeln!(prompt, "**Our Business Profile:** {}", full_profile(ctx));
    let _ = writeln!(prompt, "**Focus of SWOT:** {}\n", focus.join(", "));

    prompt.push_str(
        "**Recent Information Context (from web searches relevant to market/competitors):**\n",
    );
    let _ = writeln!(
        prompt,
        "{}\n",
        context_or(
            ctx,
            "No specific real-time data was fetched. Analysis based on general knowledge and business profile."
        )
    );

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive SWOT Analysis:**",
            "1.  **Introduction:** Briefly state the purpose of the SWOT analysis for OurCompany focusing on the specified area.",
            "2.  **Methodology:** Mention reliance on the business profile, provided search context (if any), and general industry understanding.",
            "3.  **Internal Analysis:**",
            "     * **Strengths:** Identify internal capabilities, resources, and advantages relative to the market/competitors. Be specific (e.g., 'Proprietary algorithm', 'Strong regional presence', 'Experienced engineering team'). List at least 3-5 key strengths.",
            "     * **Weaknesses:** Identify internal limitations, resource gaps, or disadvantages. Be honest and specific (e.g., 'Limited marketing budget', 'Dependency on single supplier', 'Aging technology stack'). List at least 3-5 key weaknesses.",
            "4.  **External Analysis:**",
            "     * **Opportunities:** Identify external factors or trends (use search context) that OurCompany could potentially leverage for growth or advantage (e.g., 'Growing demand in adjacent market', 'Competitor product recall', 'New favorable regulation', 'Emerging technology partnership'). List at least 3-5 key opportunities.",
            "     * **Threats:** Identify external factors or trends that could negatively impact OurCompany (e.g., 'New entrant with lower pricing', 'Changing customer preferences', 'Economic downturn impacting client budgets', 'Potential cybersecurity risks'). List at least 3-5 key threats.",
            "5.  **SWOT Matrix Summary:** Present the findings clearly, perhaps using Markdown lists under each heading (S, W, O, T).",
            "6.  **Strategic Implications & Actionable Recommendations:** This is crucial. Analyze the interactions within the SWOT matrix (TOWS analysis approach can be useful mentally):",
            "     * **SO Strategies (Strength-Opportunity):** How to use strengths to exploit opportunities?",
            "     * **WO Strategies (Weakness-Opportunity):** How to overcome weaknesses by taking advantage of opportunities?",
            "     * **ST Strategies (Strength-Threat):** How to use strengths to avoid or mitigate threats?",
            "     * **WT Strategies (Weakness-Threat):** What defensive actions are needed to prevent weaknesses from making the company vulnerable to threats?",
            "     * Provide 3-5 prioritized, actionable recommendations based on these strategic implications, suitable for a mid-size enterprise.",
        ],
    );

    close(prompt)
}

pub(super) fn marketing_strategy(ctx: &PromptContext<'_>) -> String {
    let entities = ctx.entities;
    let products = if entities.products_services.is_empty() {
        ctx.profile.core_products()
    } else {
        entities.products_services.join(", ")
    };
    let geography = entities
        .geography
        .as_deref()
        .unwrap_or("Current operating markets");
    let time_horizon = entities.time_horizon.as_deref().unwrap_or("next 12 months");
    let focus_areas = or_default_list(
        &entities.focus_areas,
        &[
            "Positioning & Messaging",
            "Channel Mix",
            "Demand Generation",
            "Customer Retention",
        ],
    );

    let mut prompt = open(
        ctx,
        "Develop a detailed, practical marketing strategy for OurCompany based on the user query and recent market information.",
    );
    let _ = writeln!(prompt, "**Our Business Profile:** {}", full_profile(ctx));
    let _ = writeln!(prompt, "**Products/Services in Scope:** {products}");
    let _ = writeln!(prompt, "**Target Customers:** {}", ctx.profile.target_customer);
    let _ = writeln!(prompt, "**Geographic Focus:** {geography}");
    let _ = writeln!(prompt, "**Planning Horizon:** {time_horizon}");
    if !entities.competitors.is_empty() {
        let _ = writeln!(
            prompt,
            "**Competitors to Position Against:** {}",
            entities.competitors.join(", ")
        );
    }
    let _ = writeln!(prompt, "**Specific Focus Areas:** {}\n", focus_areas.join(", "));

    prompt.push_str("**Recent Information Context (from web searches):**\n");
    let _ = writeln!(prompt, "{}\n", context_or(ctx, NO_CONTEXT));

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive Marketing Strategy:**",
            "1.  **Executive Summary:** Summarize the recommended strategic direction, the primary growth levers, and the expected business impact for OurCompany.",
            "2.  **Methodology:** State that the strategy draws on the business profile, the provided search context, and established marketing frameworks (e.g., STP, 4Ps, funnel analysis).",
            "3.  **Market & Audience Analysis:**",
            "     * **Segments:** Identify the most attractive customer segments and explain why.",
            "     * **Buyer Personas:** Describe 2-3 key decision-maker personas, their pain points, and buying criteria.",
            "     * **Buying Journey:** Outline how these buyers discover, evaluate, and purchase solutions like ours.",
            "4.  **Positioning & Messaging:** Define a clear value proposition and 3-4 messaging pillars. Explain how OurCompany differentiates from competitors (cite search context where applicable).",
            "5.  **Channel & Tactics Plan:** For each of the specified `focus_areas`, recommend the channels and tactics to use (e.g., content marketing, partnerships, events, account-based marketing, developer relations, paid acquisition). Indicate a realistic budget allocation split for a mid-size enterprise.",
            "6.  **Campaign Roadmap:** Lay out a phased plan across the planning horizon with milestones, owners (by function), and dependencies.",
            "7.  **Measurement Framework & Actionable Recommendations:** Provide prioritized next steps and the KPIs to track for each (e.g., pipeline generated, customer acquisition cost, conversion rates, retention/expansion revenue). Flag resource constraints and quick wins.",
        ],
    );

    close(prompt)
}

pub(super) fn financial_analysis(ctx: &PromptContext<'_>) -> String {
    let entities = ctx.entities;
    let industry = entities
        .industry
        .as_deref()
        .unwrap_or(&ctx.profile.industry);
    let time_horizon = entities.time_horizon.as_deref().unwrap_or("next 12-24 months");
    let metrics = or_default_list(
        &entities.metrics,
        &[
            "Revenue Growth",
            "Gross Margin",
            "Operating Expenses",
            "Cash Flow",
            "Unit Economics",
        ],
    );
    let focus_areas = or_default_list(
        &entities.focus_areas,
        &[
            "Profitability",
            "Cost Structure",
            "Capital Allocation",
            "Financial Risk",
        ],
    );
    let peers = if entities.competitors.is_empty() {
        "Comparable industry peers".to_string()
    } else {
        entities.competitors.join(", ")
    };

    let mut prompt = open(
        ctx,
        "Conduct a detailed financial analysis addressing the user query, with implications for a mid-size enterprise.",
    );
    let _ = writeln!(prompt, "**Our Business Profile:** {}", full_profile(ctx));
    let _ = writeln!(prompt, "**Industry Focus:** {industry}");
    let _ = writeln!(prompt, "**Time Horizon:** {time_horizon}");
    let _ = writeln!(prompt, "**Key Metrics:** {}", metrics.join(", "));
    let _ = writeln!(prompt, "**Benchmark Peers:** {peers}");
    let _ = writeln!(prompt, "**Specific Focus Areas:** {}\n", focus_areas.join(", "));

    prompt.push_str("**Recent Information Context (from web searches):**\n");
    let _ = writeln!(prompt, "{}\n", context_or(ctx, NO_CONTEXT));

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive Financial Analysis:**",
            "1.  **Executive Summary:** Summarize the financial health picture, the most important risks and opportunities, and the headline recommendation for OurCompany.",
            "2.  **Methodology:** State that no internal financial statements were provided, that the analysis relies on the business profile, the provided search context, and industry benchmarks, and clearly label any figures that are estimates.",
            "3.  **Financial Position Overview:** Describe the likely revenue model, cost structure, and capital needs of a company with this profile.",
            "4.  **Metric Deep-Dive:** For each of the key metrics, provide:",
            "     * **Definition & Relevance:** Why the metric matters for this business.",
            "     * **Industry Benchmark:** Typical ranges for comparable companies (cite search context where available).",
            "     * **Drivers:** The main levers that move the metric up or down.",
            "     * **Risks:** What could cause the metric to deteriorate.",
            "5.  **Peer Benchmarking:** Compare OurCompany's likely position against the benchmark peers on the specified `focus_areas`. Use a table where suitable.",
            "6.  **Scenario Analysis:** Outline base, upside, and downside scenarios over the time horizon, with the assumptions behind each.",
            "7.  **Financial Risk Assessment:** Identify liquidity, concentration, regulatory, and macroeconomic risks, with mitigation options.",
            "8.  **Actionable Recommendations:** Provide prioritized actions (e.g., pricing changes, cost optimization, fundraising or capital allocation decisions) and 1-2 KPIs per action to track financial impact.",
        ],
    );

    close(prompt)
}

pub(super) fn generic(ctx: &PromptContext<'_>) -> String {
    let industry = ctx
        .entities
        .industry
        .as_deref()
        .unwrap_or(&ctx.profile.industry);

    let mut prompt = open(
        ctx,
        "Address the following business query comprehensively, providing insights relevant to a mid-size enterprise.",
    );
    let _ = writeln!(
        prompt,
        "**Our Business Profile Context:** {}\n",
        short_profile(ctx, industry)
    );

    prompt.push_str("**Potentially Relevant Context (from web searches):**\n");
    let _ = writeln!(
        prompt,
        "{}\n",
        context_or(ctx, "No specific real-time data was fetched for this query.")
    );

    push_lines(
        &mut prompt,
        &[
            "**Instructions for Comprehensive Response:**",
            "1.  **Deconstruct the Query:** Clearly state your understanding of the user's core question and objective(s).",
            "2.  **Identify Key Concepts:** Define or explain any central business terms or concepts relevant to the query.",
            "3.  **Structured Analysis:** Break down the answer into logical sections. Consider multiple perspectives (e.g., financial, operational, marketing, strategic) if applicable.",
            "4.  **Incorporate Context:** Relate the analysis specifically to a *mid-size enterprise* context. How might the answer differ for a large corporation or a small startup? Use the business profile and search context where relevant.",
            "5.  **Provide Nuance:** Discuss pros and cons, potential challenges, assumptions, and trade-offs related to the query or potential solutions.",
            "6.  **Use Examples (if applicable):** Illustrate points with brief, relevant examples (hypothetical or based on general knowledge).",
            "7.  **Actionable Insights/Recommendations (if appropriate):** If the query implies seeking advice or solutions, conclude with clear, actionable steps or strategic considerations suitable for the target company profile. If the query is purely informational, summarize the key takeaways.",
        ],
    );

    close(prompt)
}
