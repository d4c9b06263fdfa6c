//! Column-name mapping for the three input tables.
//!
//! Every column the reports read is named exactly once here. Alternate
//! spreadsheet layouts are supported by overriding entries in the `schema`
//! section of the config file rather than touching report logic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SalesColumns {
    pub year: String,
    pub month: String,
    pub dials: String,
    pub calls: String,
    pub dm_conducted: String,
    pub dw_conducted: String,
    pub proposals_sent: String,
    pub proposals_sold: String,
    pub sales_value: String,
    pub dials_to_calls: String,
    pub calls_to_dm: String,
    pub dm_to_dw: String,
    pub dw_to_contract: String,
}

impl Default for SalesColumns {
    fn default() -> Self {
        SalesColumns {
            year: "Year".to_string(),
            month: "Month".to_string(),
            dials: "Dials".to_string(),
            calls: "Calls".to_string(),
            dm_conducted: "DM Conducted".to_string(),
            dw_conducted: "DW Conducted".to_string(),
            proposals_sent: "Proposals Sent".to_string(),
            proposals_sold: "Proposals Sold".to_string(),
            sales_value: "Sales Value".to_string(),
            dials_to_calls: "Dials to calls %".to_string(),
            calls_to_dm: "Calls to DM %".to_string(),
            dm_to_dw: "DMs to DW %".to_string(),
            dw_to_contract: "DWs to Contract %".to_string(),
        }
    }
}

impl SalesColumns {
    /// Conversion ratio columns paired with their display labels, in funnel order.
    pub fn conversions(&self) -> [(&str, &'static str); 4] {
        [
            (&self.dials_to_calls, "Dials→Calls %"),
            (&self.calls_to_dm, "Calls→DM %"),
            (&self.dm_to_dw, "DM→DW %"),
            (&self.dw_to_contract, "DW→Contract %"),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FinancialColumns {
    pub year: String,
    pub month: String,
    pub cashflow_coverage: String,
    pub total_sales: String,
    pub cost_of_goods_sold: String,
    pub operating_cost: String,
    pub total_cost: String,
    pub net_profit_loss: String,
    pub overdue_count: String,
    pub overdue_value: String,
}

impl Default for FinancialColumns {
    fn default() -> Self {
        FinancialColumns {
            year: "Year".to_string(),
            month: "Month".to_string(),
            cashflow_coverage: "Cashflow_Coverage_Months".to_string(),
            total_sales: "Total_Sales_Value".to_string(),
            cost_of_goods_sold: "Cost_of_Goods_Sold".to_string(),
            operating_cost: "Operating_Cost".to_string(),
            total_cost: "Total_Cost".to_string(),
            net_profit_loss: "Net_Profit_Loss".to_string(),
            overdue_count: "Overdue_Invoices_Count".to_string(),
            overdue_value: "Overdue_Invoices_Value".to_string(),
        }
    }
}

impl FinancialColumns {
    /// Columns summed per month, paired with their display labels.
    pub fn monthly(&self) -> [(&str, &'static str); 4] {
        [
            (&self.total_cost, "Cost"),
            (&self.net_profit_loss, "Net Profit"),
            (&self.total_sales, "Sales"),
            (&self.overdue_value, "Overdue"),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EvaluationColumns {
    pub trainer: String,
    pub content: String,
    pub exercise: String,
    pub facilitator: String,
    pub expectation: String,
    pub training_date: String,
}

impl Default for EvaluationColumns {
    fn default() -> Self {
        EvaluationColumns {
            trainer: "Trainer Name اسم المدرب".to_string(),
            content: "How would you rate the content? تقييم المحتوى التدريبي".to_string(),
            exercise: "How would you rate the exercises? تقييم التمارين التدريبية".to_string(),
            facilitator: "How would you rate the facilitator? تقييم المدرب".to_string(),
            expectation: "how did this session compare with your expectations? كيف كانت هذه الجلسة مقارنة بتوقعاتك؟".to_string(),
            training_date: "Training Date تاريخ الدورة التدريبية".to_string(),
        }
    }
}

impl EvaluationColumns {
    /// Rating columns paired with their short display labels.
    pub fn ratings(&self) -> [(&str, &'static str); 4] {
        [
            (&self.content, "Content"),
            (&self.exercise, "Exercise"),
            (&self.facilitator, "Facilitator"),
            (&self.expectation, "Expectation"),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    pub sales: SalesColumns,
    pub financial: FinancialColumns,
    pub evaluation: EvaluationColumns,
}
