pub mod easing;
pub mod functions;
pub mod transitions;
pub mod van_wijk;

// Re-export commonly used types and functions for convenience
pub use easing::EasingFunction;
pub use functions::{
    add_panning_ease, add_transition_ease, add_zoom_ease, create_panning,
    create_panning_great_circle, create_transition_function, create_zoom, join_transitions,
    try_create_panning, PanningFunction, TransitionFunction, ZoomFunction,
};
pub use transitions::{
    box_transition_phases, create_box_transition, create_linear_pan_transition,
    create_linear_zoom_and_pan_transition, create_perceived_linear_zoom_and_pan_transition,
    create_triangular_transition, triangular_transition_phases,
};
pub use van_wijk::create_van_wijk_and_nuij_transition;
