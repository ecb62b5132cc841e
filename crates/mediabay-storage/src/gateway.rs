use crate::traits::ObjectStorage;
use mediabay_core::AssetClass;
use std::sync::Arc;

/// The two object stores the pipeline writes to.
///
/// Images and generic files go to `assets`; videos and their thumbnails go to `videos`.
/// The store is chosen by [`AssetClass`] only.
#[derive(Clone)]
pub struct StorageGateway {
    assets: Arc<dyn ObjectStorage>,
    videos: Arc<dyn ObjectStorage>,
}

impl StorageGateway {
    pub fn new(assets: Arc<dyn ObjectStorage>, videos: Arc<dyn ObjectStorage>) -> Self {
        Self { assets, videos }
    }

    pub fn for_class(&self, class: AssetClass) -> &Arc<dyn ObjectStorage> {
        match class {
            AssetClass::Asset => &self.assets,
            AssetClass::Video => &self.videos,
        }
    }

    pub fn assets(&self) -> &Arc<dyn ObjectStorage> {
        &self.assets
    }

    pub fn videos(&self) -> &Arc<dyn ObjectStorage> {
        &self.videos
    }
}
