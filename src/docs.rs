use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use scolara_core::{BlockedDelete, DeleteReport, PaginationParams};

use crate::modules::administrations::model::{
    Administration, AdministrationListResponse, CreateAdministrationDto, UpdateAdministrationDto,
};
use crate::modules::announcements::model::{
    Announcement, AnnouncementListResponse, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use crate::modules::auth::model::{ErrorResponse, LoginRequest, LoginResponse, Principal};
use crate::modules::classes::model::{
    Class, ClassListResponse, ClassWithStats, CreateClassDto, UpdateClassDto,
};
use crate::modules::events::model::{CreateEventDto, Event, EventListResponse, UpdateEventDto};
use crate::modules::gallery::model::{GalleryItemResponse, GalleryListResponse};
use crate::modules::grades::model::{
    CreateGradeDto, Grade, GradeComponent, GradeComponentInput, GradeListResponse,
    GradeWithComponents, UpdateGradeDto,
};
use crate::modules::lessons::model::{
    CreateLessonDto, Lesson, LessonListResponse, UpdateLessonDto,
};
use crate::modules::parents::model::{
    CreateParentDto, Parent, ParentListResponse, UpdateParentDto,
};
use crate::modules::schools::model::{
    CreateSchoolDto, School, SchoolListResponse, UpdateSchoolDto,
};
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentListResponse, UpdateStudentDto,
};
use crate::modules::subjects::model::{
    CreateSubjectDto, Subject, SubjectListResponse, UpdateSubjectDto,
};
use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherListResponse, UpdateTeacherDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::schools::controller::list_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::update_school,
        crate::modules::schools::controller::delete_school,
        crate::modules::schools::controller::upload_school_logo,
        crate::modules::schools::controller::delete_school_logo,
        crate::modules::administrations::controller::list_administrations,
        crate::modules::administrations::controller::get_administration,
        crate::modules::administrations::controller::create_administration,
        crate::modules::administrations::controller::update_administration,
        crate::modules::administrations::controller::delete_administrations,
        crate::modules::teachers::controller::list_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teachers,
        crate::modules::students::controller::list_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_students,
        crate::modules::parents::controller::list_parents,
        crate::modules::parents::controller::get_parent,
        crate::modules::parents::controller::create_parent,
        crate::modules::parents::controller::update_parent,
        crate::modules::parents::controller::delete_parents,
        crate::modules::classes::controller::list_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_classes,
        crate::modules::subjects::controller::list_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::lessons::controller::list_lessons,
        crate::modules::lessons::controller::get_lesson,
        crate::modules::lessons::controller::create_lesson,
        crate::modules::lessons::controller::update_lesson,
        crate::modules::lessons::controller::delete_lesson,
        crate::modules::grades::controller::list_grades,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::announcements::controller::list_announcements,
        crate::modules::announcements::controller::get_announcement,
        crate::modules::announcements::controller::create_announcement,
        crate::modules::announcements::controller::update_announcement,
        crate::modules::announcements::controller::delete_announcement,
        crate::modules::events::controller::list_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::gallery::controller::list_gallery,
        crate::modules::gallery::controller::get_gallery_item,
        crate::modules::gallery::controller::upload_gallery_item,
        crate::modules::gallery::controller::delete_gallery_item,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            Principal,
            ErrorResponse,
            School,
            CreateSchoolDto,
            UpdateSchoolDto,
            SchoolListResponse,
            Administration,
            CreateAdministrationDto,
            UpdateAdministrationDto,
            AdministrationListResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            TeacherListResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            StudentListResponse,
            Parent,
            CreateParentDto,
            UpdateParentDto,
            ParentListResponse,
            Class,
            ClassWithStats,
            CreateClassDto,
            UpdateClassDto,
            ClassListResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            SubjectListResponse,
            Lesson,
            CreateLessonDto,
            UpdateLessonDto,
            LessonListResponse,
            Grade,
            GradeComponent,
            GradeComponentInput,
            GradeWithComponents,
            CreateGradeDto,
            UpdateGradeDto,
            GradeListResponse,
            Announcement,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            AnnouncementListResponse,
            Event,
            CreateEventDto,
            UpdateEventDto,
            EventListResponse,
            GalleryItemResponse,
            GalleryListResponse,
            DeleteReport,
            BlockedDelete,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Schools", description = "School management"),
        (name = "Administrations", description = "Administrative staff management"),
        (name = "Teachers", description = "Teacher management"),
        (name = "Students", description = "Student management"),
        (name = "Parents", description = "Parent management"),
        (name = "Classes", description = "Class management"),
        (name = "Subjects", description = "Subject management"),
        (name = "Lessons", description = "Lesson scheduling"),
        (name = "Grades", description = "Grade recording"),
        (name = "Announcements", description = "School and class announcements"),
        (name = "Events", description = "School and class events"),
        (name = "Gallery", description = "School image gallery")
    ),
    info(
        title = "Scolara API",
        version = "0.1.0",
        description = "Multi-tenant school management API with role-scoped access control.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
