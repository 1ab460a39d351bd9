//! GUI control models for the builder toolbar.
//!
//! Each control is a widget with a small set of synchronized fields. Choice
//! controls only accept one of their options; sliders coerce to a number and
//! clamp into their range.

use crate::widget::Widget;
use smallvec::SmallVec;
use svgw_core::{AttrType, AttrValue, FieldError, NodeId};

/// A pick-one control (toggle buttons or dropdown).
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: NodeId,
    pub description: String,
    pub options: Vec<String>,
    pub value: String,
}

impl Choice {
    /// Starts on `initial` when it is an option, otherwise on the first option.
    pub fn new(prefix: &str, description: &str, options: Vec<String>, initial: &str) -> Self {
        let value = if options.iter().any(|o| o == initial) {
            initial.to_string()
        } else {
            options.first().cloned().unwrap_or_default()
        };
        Self {
            id: NodeId::with_prefix(prefix),
            description: description.to_string(),
            options,
            value,
        }
    }

    fn select(&mut self, value: AttrValue) -> Result<bool, FieldError> {
        let text = AttrType::Text
            .coerce(value)
            .map_err(|source| FieldError::Coerce {
                owner: self.id,
                field: "value".into(),
                source,
            })?
            .to_string();
        if !self.options.contains(&text) {
            return Err(FieldError::NotAnOption {
                owner: self.id,
                value: text,
            });
        }
        if self.value == text {
            return Ok(false);
        }
        self.value = text;
        Ok(true)
    }
}

/// A bounded numeric control.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub id: NodeId,
    pub description: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl Slider {
    /// Reversed bounds are swapped. A NaN bound takes the other bound's value,
    /// and a NaN starting value starts at `min`.
    pub fn new(description: &str, min: f64, max: f64, step: f64, value: f64) -> Self {
        let (min, max) = match (min.min(max), min.max(max)) {
            (lo, hi) if lo.is_nan() || hi.is_nan() => (0.0, 0.0),
            bounds => bounds,
        };
        let value = if value.is_nan() { min } else { value.clamp(min, max) };
        Self {
            id: NodeId::with_prefix("slider"),
            description: description.to_string(),
            min,
            max,
            step,
            value,
        }
    }

    fn slide(&mut self, value: AttrValue) -> Result<bool, FieldError> {
        let n = AttrType::Number
            .coerce(value)
            .map_err(|source| FieldError::Coerce {
                owner: self.id,
                field: "value".into(),
                source,
            })?
            .as_number()
            .map_or(self.value, |n| n.clamp(self.min, self.max));
        if self.value == n {
            return Ok(false);
        }
        self.value = n;
        Ok(true)
    }
}

/// A horizontal row of other widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: NodeId,
    pub children: SmallVec<[NodeId; 4]>,
}

impl Row {
    pub fn new(children: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            id: NodeId::with_prefix("hbox"),
            children: children.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    ToggleButtons(Choice),
    Dropdown(Choice),
    FloatSlider(Slider),
    HBox(Row),
}

impl Control {
    /// The control's current `value`, if it has one.
    pub fn value(&self) -> Option<AttrValue> {
        self.get("value")
    }

    pub fn get(&self, field: &str) -> Option<AttrValue> {
        match (self, field) {
            (Control::ToggleButtons(c) | Control::Dropdown(c), "value") => {
                Some(AttrValue::Text(c.value.clone()))
            }
            (Control::ToggleButtons(c) | Control::Dropdown(c), "description") => {
                Some(AttrValue::Text(c.description.clone()))
            }
            (Control::FloatSlider(s), "value") => Some(AttrValue::Number(s.value)),
            (Control::FloatSlider(s), "description") => {
                Some(AttrValue::Text(s.description.clone()))
            }
            _ => None,
        }
    }

    pub fn set(&mut self, field: &str, value: AttrValue) -> Result<bool, FieldError> {
        let owner = self.id();
        match (self, field) {
            (Control::ToggleButtons(c) | Control::Dropdown(c), "value") => c.select(value),
            (Control::FloatSlider(s), "value") => s.slide(value),
            _ => Err(FieldError::UnknownField {
                owner,
                field: field.to_string(),
            }),
        }
    }
}

impl Widget for Control {
    fn id(&self) -> NodeId {
        match self {
            Control::ToggleButtons(c) | Control::Dropdown(c) => c.id,
            Control::FloatSlider(s) => s.id,
            Control::HBox(r) => r.id,
        }
    }

    fn view_name(&self) -> &str {
        match self {
            Control::ToggleButtons(_) => "ToggleButtonsView",
            Control::Dropdown(_) => "DropdownView",
            Control::FloatSlider(_) => "FloatSliderView",
            Control::HBox(_) => "HBoxView",
        }
    }

    fn state(&self) -> serde_json::Value {
        let mut state = serde_json::Map::new();
        state.insert("_view_name".into(), self.view_name().into());
        match self {
            Control::ToggleButtons(c) | Control::Dropdown(c) => {
                state.insert("description".into(), c.description.clone().into());
                state.insert("options".into(), c.options.clone().into());
                state.insert("value".into(), c.value.clone().into());
            }
            Control::FloatSlider(s) => {
                state.insert("description".into(), s.description.clone().into());
                state.insert("min".into(), AttrValue::Number(s.min).to_json());
                state.insert("max".into(), AttrValue::Number(s.max).to_json());
                state.insert("step".into(), AttrValue::Number(s.step).to_json());
                state.insert("value".into(), AttrValue::Number(s.value).to_json());
            }
            Control::HBox(r) => {
                let children: Vec<&str> = r.children.iter().map(|id| id.as_str()).collect();
                state.insert("children".into(), children.into());
            }
        }
        serde_json::Value::Object(state)
    }
}
