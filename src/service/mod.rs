use sqlx::PgPool;

pub mod authorization;
pub mod crud;

pub use authorization::{AuthorizationService, group_form_permissions, group_menu, group_permissions};
pub use crud::CrudService;

use crate::{
    models::*,
    repository::{InMemoryStore, PostgresStore, RepositoryFactory},
};

/// Services
///
/// One business service per entity plus the authorization aggregator. Built once at
/// startup and shared through `AppState`.
#[derive(Clone)]
pub struct Services {
    // Security
    pub person: CrudService<PersonDto>,
    pub user: CrudService<UserDto>,
    pub rol: CrudService<RolDto>,
    pub form: CrudService<FormDto>,
    pub module: CrudService<ModuleDto>,
    pub form_module: CrudService<FormModuleDto>,
    pub permission: CrudService<PermissionDto>,
    pub rol_form_permission: CrudService<RolFormPermissionDto>,
    pub user_rol: CrudService<UserRolDto>,
    pub user_sede: CrudService<UserSedeDto>,
    // Organization
    pub regional: CrudService<RegionalDto>,
    pub center: CrudService<CenterDto>,
    pub sede: CrudService<SedeDto>,
    // Catalog
    pub program: CrudService<ProgramDto>,
    pub process: CrudService<ProcessDto>,
    pub concept: CrudService<ConceptDto>,
    pub enterprise: CrudService<EnterpriseDto>,
    pub verification: CrudService<VerificationDto>,
    pub type_modality: CrudService<TypeModalityDto>,
    pub registery_sofia: CrudService<RegisterySofiaDto>,
    pub state: CrudService<StateDto>,
    // Training
    pub aprendiz: CrudService<AprendizDto>,
    pub instructor: CrudService<InstructorDto>,
    pub aprendiz_program: CrudService<AprendizProgramDto>,
    pub instructor_program: CrudService<InstructorProgramDto>,
    pub aprendiz_process_instructor: CrudService<AprendizProcessInstructorDto>,

    pub authorization: AuthorizationService,
}

impl Services {
    pub fn from_factory<F: RepositoryFactory>(factory: &F) -> Self {
        Self {
            person: CrudService::new(factory.repository()),
            user: CrudService::new(factory.repository()),
            rol: CrudService::new(factory.repository()),
            form: CrudService::new(factory.repository()),
            module: CrudService::new(factory.repository()),
            form_module: CrudService::new(factory.repository()),
            permission: CrudService::new(factory.repository()),
            rol_form_permission: CrudService::new(factory.repository()),
            user_rol: CrudService::new(factory.repository()),
            user_sede: CrudService::new(factory.repository()),
            regional: CrudService::new(factory.repository()),
            center: CrudService::new(factory.repository()),
            sede: CrudService::new(factory.repository()),
            program: CrudService::new(factory.repository()),
            process: CrudService::new(factory.repository()),
            concept: CrudService::new(factory.repository()),
            enterprise: CrudService::new(factory.repository()),
            verification: CrudService::new(factory.repository()),
            type_modality: CrudService::new(factory.repository()),
            registery_sofia: CrudService::new(factory.repository()),
            state: CrudService::new(factory.repository()),
            aprendiz: CrudService::new(factory.repository()),
            instructor: CrudService::new(factory.repository()),
            aprendiz_program: CrudService::new(factory.repository()),
            instructor_program: CrudService::new(factory.repository()),
            aprendiz_process_instructor: CrudService::new(factory.repository()),
            authorization: AuthorizationService::new(
                factory.authorization(),
                factory.repository(),
                factory.repository(),
            ),
        }
    }

    /// Services backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_factory(&PostgresStore::new(pool))
    }

    /// Services backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::from_factory(&InMemoryStore::new())
    }
}
