use serde::{Deserialize, Serialize};

/// Delivery speed the user wants available at their pincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryOption {
    #[default]
    Any,
    SameDay,
    OneDay,
    TwoDay,
}

impl DeliveryOption {
    pub const ALL: [DeliveryOption; 4] = [
        DeliveryOption::Any,
        DeliveryOption::SameDay,
        DeliveryOption::OneDay,
        DeliveryOption::TwoDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::Any => "any",
            DeliveryOption::SameDay => "same-day",
            DeliveryOption::OneDay => "one-day",
            DeliveryOption::TwoDay => "two-day",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

/// Snapshot of the form at submit time. `brand` and `budget_range` may be
/// empty; submission requires `product_name` and `pincode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub product_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub budget_range: String,
    #[serde(default)]
    pub delivery_option: DeliveryOption,
    pub pincode: String,
}

/// Citation attached to the response by Gemini's search grounding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSource {
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

/// One successful search: the raw markdown summary plus its citations.
#[derive(Debug, Clone, Default)]
pub struct ComparisonResult {
    pub summary: String,
    pub sources: Vec<GroundingChunk>,
}

/// Compose the natural-language request sent to Gemini. The table directive
/// at the end is what `markdown::parse_summary` relies on.
pub fn build_prompt(filters: &SearchFilters) -> String {
    let brand_line = if filters.brand.is_empty() {
        String::new()
    } else {
        format!("- Brand: {}\n", filters.brand)
    };
    let delivery = filters.delivery_option.as_str();

    format!(
        "Find the top 3 best products based on the following criteria for a user in India:\n\
         - Product: {product}\n\
         {brand_line}\
         - Budget Range: {budget}\n\
         - Delivery Preference: {delivery}\n\
         - User Pincode: {pincode}\n\
         \n\
         You MUST search for actual live listings across Amazon.in, Flipkart.com, and Myntra.com.\n\
         \n\
         Focus on:\n\
         1. Lowest price within the budget.\n\
         2. Highest number of positive reviews.\n\
         3. Availability of the requested delivery speed ({delivery}) for the given pincode ({pincode}).\n\
         \n\
         CRITICAL: Your response must start with a Markdown Table comparing the 3 products.\n\
         Columns: Platform, Product Name, Price, Rating, Delivery Time, Key Pros/Cons.\n\
         Follow the table with a brief \"Analysis\" section explaining why these options were chosen.",
        product = filters.product_name,
        brand_line = brand_line,
        budget = filters.budget_range,
        delivery = delivery,
        pincode = filters.pincode,
    )
}
