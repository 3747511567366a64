/// UI layer: egui widgets and chart rendering over the data layer.

pub mod charts;
pub mod panels;
