use crate::services::ImageRef;

/// Strict state delta. This is the ONLY way scene state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    ProcessingStarted,
    RenderFinished {
        description: String,
        image: Option<ImageRef>,
    },
}

/// Current scene description and image, plus how many renders are in flight.
#[derive(Debug, Clone)]
pub struct SceneState {
    description: String,
    image: ImageRef,
    in_flight: usize,
    /// Bumped on every accepted scene update.
    pub version: u64,
}

impl SceneState {
    pub fn new(base_description: impl Into<String>, base_image: ImageRef) -> Self {
        Self {
            description: base_description.into(),
            image: base_image,
            in_flight: 0,
            version: 0,
        }
    }

    /// Returns true when the visible scene changed.
    pub fn reduce(&mut self, delta: StateDelta) -> bool {
        match delta {
            StateDelta::ProcessingStarted => {
                self.in_flight += 1;
                false
            }
            StateDelta::RenderFinished { description, image } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                // Description and image move together or not at all.
                match image {
                    Some(image) => {
                        self.description = description;
                        self.image = image;
                        self.version += 1;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_render_leaves_scene_untouched() {
        let mut state = SceneState::new("base", ImageRef::url("base.png"));
        state.reduce(StateDelta::ProcessingStarted);
        assert!(state.is_processing());

        let changed = state.reduce(StateDelta::RenderFinished {
            description: "A pink elephant.".to_string(),
            image: None,
        });
        assert!(!changed);
        assert!(!state.is_processing());
        assert_eq!(state.description(), "base");
        assert_eq!(state.image(), &ImageRef::url("base.png"));
    }

    #[test]
    fn successful_render_replaces_both() {
        let mut state = SceneState::new("base", ImageRef::url("base.png"));
        state.reduce(StateDelta::ProcessingStarted);
        assert!(state.reduce(StateDelta::RenderFinished {
            description: "A pink elephant.".to_string(),
            image: Some(ImageRef::url("pink.png")),
        }));
        assert_eq!(state.description(), "A pink elephant.");
        assert_eq!(state.image().as_str(), "pink.png");
        assert_eq!(state.version, 1);
    }
}
