//! Prompt templates and their deterministic mock counterparts.

/// What angle a product analysis takes.
///
/// Parsing never fails: an unrecognized kind falls back to
/// [`AnalysisKind::Comprehensive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Comprehensive,
    Price,
    Reviews,
    Competition,
}

impl AnalysisKind {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price" => AnalysisKind::Price,
            "reviews" => AnalysisKind::Reviews,
            "competition" => AnalysisKind::Competition,
            _ => AnalysisKind::Comprehensive,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Comprehensive => "comprehensive",
            AnalysisKind::Price => "price",
            AnalysisKind::Reviews => "reviews",
            AnalysisKind::Competition => "competition",
        }
    }
}

/// What kind of takeaway an insights request asks for.
///
/// Unrecognized values fall back to [`InsightKind::Trends`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Trends,
    Recommendations,
    Predictions,
}

impl InsightKind {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "recommendations" => InsightKind::Recommendations,
            "predictions" => InsightKind::Predictions,
            _ => InsightKind::Trends,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::Trends => "trends",
            InsightKind::Recommendations => "recommendations",
            InsightKind::Predictions => "predictions",
        }
    }
}

/// Builds the provider prompt for a product analysis.
#[must_use]
pub fn analysis_prompt(asin: &str, kind: AnalysisKind) -> String {
    match kind {
        AnalysisKind::Comprehensive => format!(
            "Provide a comprehensive analysis of Amazon product {asin}, including market \
             position, pricing strategy, customer sentiment, and competitive landscape."
        ),
        AnalysisKind::Price => format!(
            "Analyze the pricing strategy and price competitiveness of Amazon product {asin}."
        ),
        AnalysisKind::Reviews => {
            format!("Analyze customer reviews and sentiment for Amazon product {asin}.")
        }
        AnalysisKind::Competition => {
            format!("Analyze the competitive landscape for Amazon product {asin}.")
        }
    }
}

/// Builds the provider prompt for an analytics-insights request.
///
/// The structured data rides along pretty-printed so the same input always
/// produces the same prompt text.
#[must_use]
pub fn insights_prompt(data: &serde_json::Value, kind: InsightKind) -> String {
    let data_str = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    match kind {
        InsightKind::Trends => format!(
            "Analyze the following analytics data and provide insights on trends:\n{data_str}"
        ),
        InsightKind::Recommendations => format!(
            "Based on the following data, provide actionable recommendations:\n{data_str}"
        ),
        InsightKind::Predictions => format!(
            "Based on the following data, provide predictions for future performance:\n{data_str}"
        ),
    }
}

/// Deterministic analysis text used when no provider is configured or the
/// provider call fails.
#[must_use]
pub fn mock_analysis(asin: &str, kind: AnalysisKind) -> String {
    match kind {
        AnalysisKind::Comprehensive => format!(
            "Analysis for {asin}: this product holds a stable position in its category. \
             Pricing sits near the category median, review sentiment is broadly positive, \
             and the main competitive pressure comes from better-known brands at similar \
             price points. Configure a text-generation provider for a live analysis."
        ),
        AnalysisKind::Price => format!(
            "Price analysis for {asin}: the current price is competitive for the category. \
             Historical observations suggest limited discounting; price moves have tracked \
             category-wide promotions. Configure a text-generation provider for a live \
             analysis."
        ),
        AnalysisKind::Reviews => format!(
            "Review analysis for {asin}: customer feedback skews positive, with recurring \
             praise for build quality and recurring complaints about shipping condition. \
             Configure a text-generation provider for a live analysis."
        ),
        AnalysisKind::Competition => format!(
            "Competitive analysis for {asin}: the listing competes primarily on price and \
             review volume against a small set of established alternatives. Configure a \
             text-generation provider for a live analysis."
        ),
    }
}

/// Deterministic insights text used when no provider is configured or the
/// provider call fails.
#[must_use]
pub fn mock_insights(data: &serde_json::Value, kind: InsightKind) -> String {
    let field_count = data.as_object().map_or(0, serde_json::Map::len);
    match kind {
        InsightKind::Trends => format!(
            "Trend insights over {field_count} supplied metrics: recent activity is steady \
             with no significant inflection points. Configure a text-generation provider \
             for live insights."
        ),
        InsightKind::Recommendations => format!(
            "Recommendations from {field_count} supplied metrics: keep pricing stable, \
             monitor conversion-heavy products for stock-outs, and revisit underperforming \
             listings. Configure a text-generation provider for live insights."
        ),
        InsightKind::Predictions => format!(
            "Predictions from {field_count} supplied metrics: expect performance to track \
             the current baseline absent pricing or catalog changes. Configure a \
             text-generation provider for live insights."
        ),
    }
}
