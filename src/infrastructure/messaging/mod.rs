pub mod whatsapp_cloud;

pub use whatsapp_cloud::WhatsappCloudClient;
