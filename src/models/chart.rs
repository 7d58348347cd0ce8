use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub hour: u32,
    pub value: f64,
}

/// A line chart for one day of the selected month, ready to be handed to a widget layer
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Chart {
    pub day: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}
