mod media_store_factory;
mod object_media_store;

pub use media_store_factory::MediaStoreFactory;
pub use object_media_store::ObjectMediaStore;
